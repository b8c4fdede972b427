#[cfg(test)]
mod test {
    use assert_cmd::Command;
    use predicates::str::contains;
    use rstest::{fixture, rstest};

    #[fixture]
    fn cmd() -> Command {
        let mut cmd = Command::cargo_bin("bdecomp").unwrap();
        cmd.arg("cut");
        cmd
    }

    #[rstest]
    #[case("rank", &["a", "b"], "1\n")]
    #[case("rank", &["a", "c"], "2\n")]
    #[case("maximum-matching", &["a", "c"], "2\n")]
    #[case("boolean", &["b"], "1\n")]
    #[case("boolean", &["a", "b", "c", "d"], "0\n")]
    fn path_cuts(mut cmd: Command, #[case] width: &str, #[case] side: &[&str], #[case] out: &str) {
        cmd.args(["../graphs/path4.dgf", "--width", width])
            .args(side)
            .assert()
            .success()
            .stdout(out.to_string());
    }

    #[rstest]
    fn unknown_vertex(mut cmd: Command) {
        cmd.args(["../graphs/path4.dgf", "a", "z"])
            .assert()
            .failure()
            .stderr(contains("Unknown vertex 'z'"));
    }

    #[rstest]
    fn needs_vertices(mut cmd: Command) {
        cmd.arg("../graphs/path4.dgf").assert().failure();
    }
}
