use gcf_search::CliError;

fn is_json_args() -> bool {
    std::env::args().any(|arg| arg == "--json")
}

fn report_error(err: &CliError) -> ! {
    if is_json_args() {
        let payload = serde_json::json!({
            "error": {
                "code": err.code,
                "kind": err.kind,
                "message": err.message,
                "hint": err.hint,
                "retryable": err.retryable,
            }
        });
        eprintln!("{payload}");
    } else if err.message.starts_with("error:") {
        // clap already formatted it
        eprintln!("{}", err.message.trim_end());
    } else {
        eprintln!("error: {}", err.message);
        if let Some(hint) = &err.hint {
            eprintln!("hint: {hint}");
        }
    }
    std::process::exit(err.code);
}

fn main() {
    // Load .env early; ignore if missing.
    dotenvy::dotenv().ok();

    let raw_args: Vec<String> = std::env::args().collect();
    let parsed = match gcf_search::parse_cli(raw_args) {
        Ok(parsed) => parsed,
        Err(err) => report_error(&err),
    };
    if let Err(err) = gcf_search::run_with_parsed(parsed) {
        report_error(&err);
    }
}
