use assert_cmd::Command;

#[test]
fn routes_lists_the_books_surface() {
    let output = Command::cargo_bin("bookshelf-cli")
        .unwrap()
        .arg("routes")
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("GET     /books\n"));
    assert!(stdout.contains("DELETE  /books/{id}\n"));
}

#[test]
fn unknown_command_fails() {
    Command::cargo_bin("bookshelf-cli")
        .unwrap()
        .arg("explode")
        .assert()
        .failure();
}
