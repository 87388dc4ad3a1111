use std::io::{stdin, stdout, Write};

use anyhow::Result;
use cache_sim::trace::Trace;

use crate::{
    command::parse_command,
    session::{Flow, Session},
};

pub fn execute_interactive<T: Trace>(session: &mut Session<T>) -> Result<()> {
    println!("entering interactive.");
    let mut out = stdout();
    loop {
        print!("> ");
        out.flush()?;
        let mut str = String::new();
        if stdin().read_line(&mut str)? == 0 {
            break;
        }
        let parsed = match parse_command(&str) {
            Ok(p) => p,
            Err(e) => {
                println!("parse error: expected {}", e.expected);
                continue;
            }
        };
        match session.apply(parsed, &mut out) {
            Ok(Flow::Continue) => (),
            Ok(Flow::Exit) => break,
            Err(e) => println!("{e}"),
        }
    }
    println!("exiting interactive.");
    Ok(())
}
