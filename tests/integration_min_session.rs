// Drives the compiled binary through a PTY: auto-login, start, type, submit,
// close the results and quit.
//
// Needs a TTY, so it is Unix-only and ignored by default.
// Run with: `cargo test --test integration_min_session -- --ignored`.

#![cfg(unix)]

use std::time::Duration;

use expectrl::{spawn, Eof};

#[test]
#[ignore]
fn minimal_session_completes_and_exits() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let bin = assert_cmd::cargo::cargo_bin("wordsprint");
    let cmd = format!(
        "{} -p hi -u x --password y --db {} --log-file {}",
        bin.display(),
        dir.path().join("users.db").display(),
        dir.path().join("wordsprint.log").display(),
    );

    let mut p = spawn(cmd)?;
    std::thread::sleep(Duration::from_millis(300));

    // start, then wait out the countdown
    p.send("\r")?;
    std::thread::sleep(Duration::from_millis(3600));

    p.send("hi")?;
    std::thread::sleep(Duration::from_millis(200));
    p.send("\r")?;
    std::thread::sleep(Duration::from_millis(200));

    // first ESC closes the results, second one quits
    p.send("\x1b")?;
    std::thread::sleep(Duration::from_millis(200));
    p.send("\x1b")?;

    p.expect(Eof)?;
    Ok(())
}
