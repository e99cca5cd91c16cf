use crate::domain::models::{ErrorBody, JsonErr, JsonOut};
use crate::errors::{classify, exit_for};
use serde::Serialize;

pub fn print_out<T: Serialize>(
    json: bool,
    ok: bool,
    data: &[T],
    row: impl Fn(&T) -> String,
) -> anyhow::Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&JsonOut { ok, data })?
        );
    } else {
        for d in data {
            println!("{}", row(d));
        }
    }
    Ok(())
}

pub fn print_one<T: Serialize>(
    json: bool,
    ok: bool,
    data: T,
    render: impl Fn(&T) -> String,
) -> anyhow::Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&JsonOut { ok, data })?
        );
    } else {
        println!("{}", render(&data));
    }
    Ok(())
}

/// Errors go to stdout as JSON in `--json` mode so CI log parsers see one document either way.
pub fn print_error(json: bool, err: &anyhow::Error) {
    let exit = exit_for(err);
    if json {
        let body = JsonErr {
            ok: false,
            error: ErrorBody {
                kind: classify(err)
                    .map(|e| e.kind())
                    .unwrap_or("internal")
                    .to_string(),
                message: format!("{err:#}"),
                exit_code: exit.code(),
            },
        };
        match serde_json::to_string_pretty(&body) {
            Ok(s) => println!("{s}"),
            Err(_) => eprintln!("error: {err:#}"),
        }
    } else {
        eprintln!("error: {err:#}");
    }
}
