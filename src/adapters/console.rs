//! Terminal-backed `Communicator`.
use std::io::{BufRead, Write};

use super::{Communicator, Progress};

/// Prompts on stdout, reads answers from stdin, prints progress dots.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConsoleCommunicator;

struct ConsoleProgress;

impl Progress for ConsoleProgress {
    fn advance(&mut self) {
        print!(".");
        let _ = std::io::stdout().flush();
    }

    fn done(&mut self) {
        println!(" done");
    }
}

impl Communicator for ConsoleCommunicator {
    fn ask(&self, prompt: &str, default: Option<&str>) -> String {
        match default {
            Some(d) => print!("{prompt} [{d}]: "),
            None => print!("{prompt}: "),
        }
        let _ = std::io::stdout().flush();
        let mut line = String::new();
        let _ = std::io::stdin().lock().read_line(&mut line);
        let answer = line.trim();
        if answer.is_empty() {
            default.unwrap_or_default().to_string()
        } else {
            answer.to_string()
        }
    }

    fn report(&self, msg: &str) {
        println!("{msg}");
    }

    fn warning(&self, msg: &str) {
        eprintln!("warning: {msg}");
    }

    fn error(&self, msg: &str) {
        eprintln!("error: {msg}");
    }

    fn progress(&self, label: &str) -> Box<dyn Progress> {
        print!("{label} ");
        let _ = std::io::stdout().flush();
        Box::new(ConsoleProgress)
    }
}
