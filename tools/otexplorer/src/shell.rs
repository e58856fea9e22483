//! Interactive shell
//!
//! A thin line-oriented wrapper over [`ExplorerClient`]: one command per
//! line, failures are printed but never end the session. Retries are
//! always on in the shell.

use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::client::ExplorerClient;

const HELP: &str = "\
Commands:
  r|read <id>[/<value>]     read one data-id
  w|write <id> <value>      write one data-id
  rt|readtsp [<n>|<a-b>]    read transparent slave parameters
  wt|writetsp <n> <value>   write one transparent slave parameter
  re|readerr [<n>]          read the fault-history buffer
  s|scan                    read all readable data-ids
  f|fullscan [<a>|<a-b>]    try reading every data-id in a range
  v|verbose                 toggle verbose decoding
  h|help                    this text
  q|quit                    leave the shell";

pub async fn run(client: &mut ExplorerClient) {
    let mut editor = match DefaultEditor::new() {
        Ok(editor) => editor,
        Err(e) => {
            eprintln!("{} cannot start shell: {e}", "Error!".red());
            return;
        }
    };
    client.retry = true;
    println!("{HELP}");

    loop {
        let line = match editor.readline("Enter command (h for help)> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("{} {e}", "Error!".red());
                break;
            }
        };
        let _ = editor.add_history_entry(&line);
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((&command, args)) = words.split_first() else {
            continue;
        };

        let outcome = match (command, args) {
            ("q" | "quit" | "exit", _) => break,
            ("h" | "help", _) => {
                println!("{HELP}");
                Ok(())
            }
            ("v" | "verbose", _) => {
                client.verbose = !client.verbose;
                println!(
                    "verbose {}",
                    if client.verbose { "on" } else { "off" }
                );
                Ok(())
            }
            ("s" | "scan", _) => client.scan().await,
            ("f" | "fullscan", args) => client.full_scan(args.first().copied()).await,
            ("r" | "read", [spec]) => client.read(spec).await,
            ("w" | "write", [id, value]) => match id.parse() {
                Ok(id) => client.write(id, value).await,
                Err(_) => {
                    eprintln!("{} invalid data-id '{id}'", "Error!".red());
                    Ok(())
                }
            },
            ("rt" | "readtsp", args) => client.read_tsp(args.first().copied()).await,
            ("wt" | "writetsp", [id, value]) => match id.parse() {
                Ok(id) => client.write_tsp(id, value).await,
                Err(_) => {
                    eprintln!("{} invalid parameter index '{id}'", "Error!".red());
                    Ok(())
                }
            },
            ("re" | "readerr", args) => client.read_err(args.first().copied()).await,
            _ => {
                eprintln!("{} unknown command, h for help", "Error!".red());
                Ok(())
            }
        };
        if let Err(failure) = outcome {
            eprintln!("{} {}", "Error!".red(), failure.message);
        }
    }
    println!("Bye.");
}
