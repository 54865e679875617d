use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

fn liftoff() -> assert_cmd::Command {
    cargo_bin_cmd!("liftoff")
}

/// A project directory plus a private temp dir for the rendered env file.
struct Project {
    dir: TempDir,
    tmp: TempDir,
}

impl Project {
    fn new(env: Option<&str>, config: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let tmp = TempDir::new().unwrap();
        if let Some(env) = env {
            std::fs::write(dir.path().join(".env.local"), env).unwrap();
        }
        std::fs::write(dir.path().join("liftoff.toml"), config).unwrap();
        Self { dir, tmp }
    }

    fn cmd(&self) -> assert_cmd::Command {
        let mut cmd = liftoff();
        cmd.current_dir(self.dir.path())
            .env("TMPDIR", self.tmp.path())
            .env("RUST_LOG", "info");
        cmd
    }

    fn tmp_is_empty(&self) -> bool {
        std::fs::read_dir(self.tmp.path()).unwrap().next().is_none()
    }
}

const MISSING_GCLOUD: &str = r#"
[gcloud]
bin = "liftoff-test-gcloud-does-not-exist"
"#;

// ── Help / Version ──

#[test]
fn shows_help() {
    liftoff()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("deploy to Cloud Run"))
        .stdout(predicate::str::contains("deploy"))
        .stdout(predicate::str::contains("url"))
        .stdout(predicate::str::contains("env"));
}

#[test]
fn shows_version() {
    liftoff()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("liftoff"));
}

// ── Env Command ──

#[test]
fn env_lists_keys_with_masked_values() {
    let project = Project::new(
        Some("GEMINI_API_KEY=\"sk-secret\"\nDATABASE_URL=postgres://x?a=1\n"),
        "",
    );

    project
        .cmd()
        .arg("env")
        .assert()
        .success()
        .stdout(predicate::str::contains("GEMINI_API_KEY=*** (9 chars)"))
        .stdout(predicate::str::contains("DATABASE_URL=***"))
        .stdout(predicate::str::contains("sk-secret").not())
        .stdout(predicate::str::contains("Warning").not());
}

#[test]
fn env_warns_on_missing_required_key() {
    let project = Project::new(Some("OTHER=1\n"), "");

    project
        .cmd()
        .arg("env")
        .assert()
        .success()
        .stdout(predicate::str::contains("Warning: GEMINI_API_KEY not set"));
}

#[test]
fn env_fails_without_env_file() {
    let project = Project::new(None, "");

    project
        .cmd()
        .arg("env")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("env file not found"))
        .stderr(predicate::str::contains("no environment variables found"));
}

#[test]
fn env_respects_configured_file() {
    let project = Project::new(None, "[env]\nfile = \"prod.env\"\n");
    std::fs::write(project.dir.path().join("prod.env"), "GEMINI_API_KEY=k\n").unwrap();

    project
        .cmd()
        .arg("env")
        .assert()
        .success()
        .stdout(predicate::str::contains("GEMINI_API_KEY=*** (1 chars)"));
}

// ── Deploy Command (no GCP) ──

#[test]
fn deploy_fails_without_env_file() {
    let project = Project::new(None, MISSING_GCLOUD);

    project
        .cmd()
        .arg("deploy")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Reading env from .env.local"))
        .stdout(predicate::str::contains("[1/3]").not())
        .stderr(predicate::str::contains("no environment variables found"));
}

#[test]
fn deploy_fails_with_comment_only_env_file() {
    let project = Project::new(Some("# GEMINI_API_KEY=\n\n"), MISSING_GCLOUD);

    project
        .cmd()
        .arg("deploy")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("no environment variables found"));
}

#[test]
fn deploy_is_the_default_command() {
    let project = Project::new(None, MISSING_GCLOUD);

    project
        .cmd()
        .assert()
        .code(1)
        .stderr(predicate::str::contains("no environment variables found"));
}

#[test]
fn deploy_reports_missing_gcloud() {
    let project = Project::new(Some("GEMINI_API_KEY=abc\n"), MISSING_GCLOUD);

    project
        .cmd()
        .arg("deploy")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("[1/3]"))
        .stdout(predicate::str::contains("[2/3]").not())
        .stderr(predicate::str::contains(
            "command not found: liftoff-test-gcloud-does-not-exist",
        ));

    assert!(project.tmp_is_empty());
}

#[test]
fn deploy_rejects_invalid_config() {
    let project = Project::new(Some("A=1\n"), "not valid {{{{ toml");

    project
        .cmd()
        .arg("deploy")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("failed to parse config"));
}

#[test]
fn url_reports_missing_gcloud() {
    let project = Project::new(None, MISSING_GCLOUD);

    project
        .cmd()
        .arg("url")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("command not found"));
}

// ── Deploy against a fake gcloud ──

#[cfg(unix)]
mod fake_gcloud {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};

    /// Logs every invocation, copies the env vars file handed to
    /// `run deploy`, and exits with codes taken from the environment.
    const SCRIPT: &str = r#"#!/bin/sh
echo "$*" >> "$FAKE_LOG"
case "$1 $2" in
  "builds submit")
    exit "${FAKE_BUILD_EXIT:-0}"
    ;;
  "run deploy")
    while [ $# -gt 0 ]; do
      if [ "$1" = "--env-vars-file" ]; then
        cp "$2" "$FAKE_LOG.env"
      fi
      shift
    done
    if [ "${FAKE_DEPLOY_EXIT:-0}" != 0 ]; then
      echo "ERROR: (gcloud.run.deploy) PERMISSION_DENIED" >&2
    fi
    exit "${FAKE_DEPLOY_EXIT:-0}"
    ;;
  "run services")
    printf '%s' "${FAKE_URL-https://openwork-xyz-uc.a.run.app}"
    exit "${FAKE_DESCRIBE_EXIT:-0}"
    ;;
esac
exit 99
"#;

    struct Fake {
        project: Project,
        log: PathBuf,
    }

    impl Fake {
        fn new(env: &str) -> Self {
            let project = Project::new(Some(env), "");
            let script = project.dir.path().join("fake-gcloud");
            std::fs::write(&script, SCRIPT).unwrap();
            std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
            std::fs::write(
                project.dir.path().join("liftoff.toml"),
                format!("[gcloud]\nbin = \"{}\"\n", script.display()),
            )
            .unwrap();

            let log = project.dir.path().join("gcloud.log");
            Self { project, log }
        }

        fn cmd(&self) -> assert_cmd::Command {
            let mut cmd = self.project.cmd();
            cmd.env("FAKE_LOG", &self.log);
            cmd
        }

        fn calls(&self) -> Vec<String> {
            read_lines(&self.log)
        }

        fn rendered_env(&self) -> String {
            std::fs::read_to_string(self.log.with_extension("log.env")).unwrap()
        }
    }

    fn read_lines(path: &Path) -> Vec<String> {
        match std::fs::read_to_string(path) {
            Ok(content) => content.lines().map(str::to_owned).collect(),
            Err(_) => Vec::new(),
        }
    }

    #[test]
    fn full_deploy_prints_live_url() {
        let fake = Fake::new("GEMINI_API_KEY=abc\nA=1\nB=\"two\"\n");

        fake.cmd()
            .arg("deploy")
            .assert()
            .success()
            .stdout(predicate::str::contains("Project: limitless-ai-483404"))
            .stdout(predicate::str::contains("[1/3] Building image"))
            .stdout(predicate::str::contains("[2/3] Deploying to Cloud Run"))
            .stdout(predicate::str::contains("[3/3] Service URL:"))
            .stdout(predicate::str::contains("  https://openwork-xyz-uc.a.run.app"))
            .stdout(predicate::str::contains("Deployment successful."));

        let calls = fake.calls();
        assert_eq!(calls.len(), 3, "calls: {calls:?}");
        assert!(calls[0].starts_with(
            "builds submit --tag gcr.io/limitless-ai-483404/openwork:latest --project limitless-ai-483404"
        ));
        assert!(calls[1].starts_with("run deploy openwork --image gcr.io/limitless-ai-483404/openwork:latest"));
        assert!(calls[1].contains("--port 8080 --memory 1Gi --timeout 300 --min-instances 0 --max-instances 10"));
        assert!(calls[2].starts_with("run services describe openwork"));

        let rendered = fake.rendered_env();
        assert!(rendered.contains("B: two"), "rendered: {rendered}");
        assert!(rendered.contains("GEMINI_API_KEY: abc"), "rendered: {rendered}");

        assert!(fake.project.tmp_is_empty());
    }

    #[test]
    fn build_failure_propagates_exit_code() {
        let fake = Fake::new("GEMINI_API_KEY=abc\n");

        fake.cmd()
            .arg("deploy")
            .env("FAKE_BUILD_EXIT", "3")
            .assert()
            .code(3)
            .stdout(predicate::str::contains("[2/3]").not())
            .stderr(predicate::str::contains("cloud build submission failed"));

        let calls = fake.calls();
        assert_eq!(calls.len(), 1, "calls: {calls:?}");
        assert!(calls[0].starts_with("builds submit"));
        assert!(fake.project.tmp_is_empty());
    }

    #[test]
    fn deploy_failure_propagates_exit_code_and_cleans_up() {
        let fake = Fake::new("GEMINI_API_KEY=abc\n");

        fake.cmd()
            .arg("deploy")
            .env("FAKE_DEPLOY_EXIT", "4")
            .assert()
            .code(4)
            .stdout(predicate::str::contains("[3/3]").not())
            .stderr(predicate::str::contains("cloud run deployment failed"));

        assert_eq!(fake.calls().len(), 2);
        assert!(fake.rendered_env().contains("GEMINI_API_KEY: abc"));
        assert!(fake.project.tmp_is_empty());
    }

    #[test]
    fn describe_failure_propagates_exit_code() {
        let fake = Fake::new("GEMINI_API_KEY=abc\n");

        fake.cmd()
            .arg("deploy")
            .env("FAKE_DESCRIBE_EXIT", "6")
            .assert()
            .code(6)
            .stdout(predicate::str::contains("Deployment successful.").not());

        assert!(fake.project.tmp_is_empty());
    }

    #[test]
    fn empty_describe_output_prints_expected_url() {
        let fake = Fake::new("GEMINI_API_KEY=abc\n");

        fake.cmd()
            .arg("deploy")
            .env("FAKE_URL", "")
            .assert()
            .success()
            .stdout(predicate::str::contains(
                "  https://openwork-217388700222.us-central1.run.app",
            ))
            .stdout(predicate::str::contains("Deployment finished."))
            .stdout(predicate::str::contains("Deployment successful.").not());
    }

    #[test]
    fn missing_credential_warns_but_deploys() {
        let fake = Fake::new("OTHER=1\n");

        fake.cmd()
            .arg("deploy")
            .assert()
            .success()
            .stdout(predicate::str::contains("Warning: GEMINI_API_KEY not set in .env.local"))
            .stdout(predicate::str::contains("Deployment successful."));

        assert_eq!(fake.calls().len(), 3);
    }

    #[test]
    fn url_prints_live_url() {
        let fake = Fake::new("A=1\n");

        fake.cmd()
            .arg("url")
            .assert()
            .success()
            .stdout(predicate::str::diff("https://openwork-xyz-uc.a.run.app\n"));

        let calls = fake.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].contains("--format value(status.url)"));
    }

    #[test]
    fn url_falls_back_to_expected_url() {
        let fake = Fake::new("A=1\n");

        fake.cmd()
            .arg("url")
            .env("FAKE_URL", "")
            .assert()
            .success()
            .stdout(predicate::str::contains(
                "https://openwork-217388700222.us-central1.run.app",
            ))
            .stderr(predicate::str::contains("returned no URL"));
    }
}
