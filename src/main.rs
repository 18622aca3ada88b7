use dealflow::cli::run;
use dealflow::error::BoardError;

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        // Validation failures are user errors; everything else is internal
        // (persistence failures, schema problems, panicked sync threads).
        if matches!(e.downcast_ref::<BoardError>(), Some(BoardError::Validation(_))) {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }

        eprintln!("Internal error: {}", e);
        let mut causes = e.chain().skip(1).peekable();
        if causes.peek().is_some() {
            eprintln!("\nCaused by:");
            for (indent, err) in causes.enumerate() {
                eprintln!("{:indent$}  {}", "", err, indent = indent + 1);
            }
        }
        std::process::exit(2);
    }
}
