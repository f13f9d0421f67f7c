use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::Parser;

use mp3meta::id3v1::GENRES;
use mp3meta::{Id3v1Tag, Result};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// Read and write ID3v1/ID3v1.1 tags.
///
/// Without `-w` the run is a dry run: the tag is decoded, modified in
/// memory and displayed, but never written back.
#[derive(Parser, Debug)]
#[command(name = "mp3meta", version, about = "Read and write ID3v1/ID3v1.1 tags")]
struct Cli {
    /// List all genres with their canonical index
    #[arg(short = 'l', long = "list-genres")]
    list_genres: bool,

    /// Commit changes to the file
    #[arg(short = 'w', long = "write")]
    write: bool,

    /// Title (max 30 characters)
    #[arg(short = 'T', long, value_name = "TITLE")]
    title: Option<String>,

    /// Artist (max 30 characters)
    #[arg(short = 'a', long, value_name = "ARTIST")]
    artist: Option<String>,

    /// Album (max 30 characters)
    #[arg(short = 'b', long, value_name = "ALBUM")]
    album: Option<String>,

    /// Year (up to 4 digits)
    #[arg(short = 'y', long, value_name = "YEAR")]
    year: Option<u16>,

    /// Track number (a non-zero track switches the tag to v1.1)
    #[arg(short = 't', long, value_name = "TRACK")]
    track: Option<u8>,

    /// Genre index (see -l)
    #[arg(short = 'g', long, value_name = "GENRE")]
    genre: Option<u8>,

    /// Comment (max 30 characters, 28 when a track number is set)
    #[arg(short = 'c', long, value_name = "COMMENT")]
    comment: Option<String>,

    /// Audio file to inspect or modify
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let is_help = matches!(
                err.kind(),
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion
            );
            let _ = err.print();
            return if is_help {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            };
        }
    };

    if cli.list_genres {
        list_genres();
        return ExitCode::SUCCESS;
    }

    let Some(file) = cli.file.clone() else {
        eprintln!("error: no input file");
        return ExitCode::FAILURE;
    };

    match run(&cli, &file) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli, file: &PathBuf) -> Result<()> {
    let mut tag = match Id3v1Tag::read_from(file) {
        Ok(tag) => tag,
        Err(err) if err.is_recoverable() => {
            eprintln!("error: {}", err);
            Id3v1Tag::new()
        }
        Err(err) => return Err(err),
    };

    if let Some(title) = &cli.title {
        tag.set_title(title);
    }
    if let Some(artist) = &cli.artist {
        tag.set_artist(artist);
    }
    if let Some(album) = &cli.album {
        tag.set_album(album);
    }
    if let Some(year) = cli.year {
        tag.set_year(year)?;
    }
    if let Some(track) = cli.track {
        tag.set_track(track);
    }
    if let Some(genre) = cli.genre {
        tag.set_genre(genre);
    }
    if let Some(comment) = &cli.comment {
        tag.set_comment(comment);
    }

    if cli.write {
        tag.save(file)?;
    }

    println!("{}", tag);
    Ok(())
}

/// Print the genre table, paginated to the terminal height.
fn list_genres() {
    let page = terminal_rows().saturating_sub(1).max(1);
    let stdin = io::stdin();

    for (index, name) in GENRES.iter().enumerate() {
        if index > 0 && index % page == 0 {
            print!("press Enter to continue");
            let _ = io::stdout().flush();
            let _ = stdin.lock().read_line(&mut String::new());
        }
        println!("{}: {}", index, name);
    }
}

/// Terminal height in rows, with a fixed fallback when stdout is not a tty.
fn terminal_rows() -> usize {
    // SAFETY: TIOCGWINSZ only writes into the winsize struct we hand it
    unsafe {
        let mut ws: libc::winsize = std::mem::zeroed();
        if libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &mut ws) == 0 && ws.ws_row > 0 {
            return ws.ws_row as usize;
        }
    }
    20
}
