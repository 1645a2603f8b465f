//! Dictionary assembly tool.
//!
//! Builds one or more source dictionaries into the packed binary collection
//! format `steno_engine::dict::packed` reads, and can dump a built collection
//! back out for inspection. Supported source formats:
//!
//! - `json`: Plover's native dictionary format.
//! - `rtf`: RTF/CRE, as used by the Phoenix dictionary.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use clap::{Parser, Subcommand, ValueEnum};
use steno_engine::dict::packed::{Collection, Format};
use steno_engine::dict::Dict;
use steno_engine::stroke::StenoWord;

mod encode;
mod jsondict;
mod rtfcre;

pub type Result<T> = anyhow::Result<T>;

#[derive(Parser)]
#[command(name = "steno-dict-tool")]
#[command(about = "Assemble and inspect packed steno dictionaries", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Physical hash-block encoding to write, per `dict::packed::Format`.
#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    /// 128 slots per block, 24-bit record fields.
    Compact,
    /// 32 slots per block, 32-bit record fields.
    Full,
}

impl From<FormatArg> for Format {
    fn from(arg: FormatArg) -> Format {
        match arg {
            FormatArg::Compact => Format::Compact,
            FormatArg::Full => Format::Full,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Build one packed dictionary collection out of the given source files.
    Build {
        /// Output file.
        #[arg(short, long, value_name = "FILE")]
        output: String,

        /// Disable reverse-suffix lookup support in the resulting header.
        #[arg(long)]
        no_reverse_lookup: bool,

        /// Physical hash-table encoding to use for every dictionary's strokes definitions.
        #[arg(long, value_enum, default_value = "full")]
        format: FormatArg,

        /// Input dictionary files to build; each becomes one named dictionary in the
        /// collection, in the order given.
        #[arg(required = true)]
        files: Vec<String>,
    },

    /// Print the contents of a packed dictionary collection as JSON lines.
    Show {
        /// The file to show.
        filename: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Build {
            output,
            no_reverse_lookup,
            format,
            files,
        } => {
            let mut dicts = Vec::new();
            for f in files {
                let entries = load_dict(f)?;
                let name = Path::new(f)
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or(f)
                    .to_string();
                println!("encoding {} ({} entries)", name, entries.len());
                dicts.push(encode::DictSource {
                    name,
                    default_enabled: true,
                    entries,
                });
            }

            let data = encode::build_collection(&dicts, !no_reverse_lookup, (*format).into());
            println!("writing {} bytes to {}", data.len(), output);
            File::create(output)?.write_all(&data)?;
        }
        Commands::Show { filename } => {
            let mut data = Vec::new();
            File::open(filename)?.read_to_end(&mut data)?;
            let collection = Collection::load(&data)?;
            for dict in &collection.dictionaries {
                println!(
                    "# {} (max outline {}, {})",
                    dict.name,
                    dict.longest_key(),
                    if dict.default_enabled {
                        "enabled"
                    } else {
                        "disabled"
                    }
                );
                print!("{}", dict.print());
            }
        }
    }

    Ok(())
}

fn load_dict(name: &str) -> Result<BTreeMap<StenoWord, String>> {
    if name.ends_with(".json") {
        jsondict::import(name)
    } else if name.ends_with(".rtf") {
        rtfcre::import(name)
    } else {
        Err(anyhow::anyhow!("unknown dictionary file type: {}", name))
    }
}
