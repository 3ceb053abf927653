//! Basic CLI E2E tests.
//!
//! Each test runs the built binary against its own temporary HOME so the
//! SQLite store and config file are isolated.

use std::process::Command;
use tempfile::TempDir;

struct Cli {
    home: TempDir,
}

impl Cli {
    fn new() -> Self {
        Self {
            home: TempDir::new().expect("tempdir"),
        }
    }

    /// Run a CLI command and return (stdout, stderr, exit code).
    fn run(&self, args: &[&str]) -> (String, String, i32) {
        let output = Command::new(env!("CARGO_BIN_EXE_reportmii-cli"))
            .args(args)
            .env("HOME", self.home.path())
            .env("REPORTMII_USER", "tester")
            .env_remove("REPORTMII_ENV")
            .env_remove("RUST_LOG")
            .output()
            .expect("Failed to execute CLI command");

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        let code = output.status.code().unwrap_or(-1);
        (stdout, stderr, code)
    }

    fn ok(&self, args: &[&str]) -> String {
        let (stdout, stderr, code) = self.run(args);
        assert_eq!(code, 0, "command {args:?} failed: {stderr}");
        stdout
    }

    fn fails(&self, args: &[&str]) -> String {
        let (_, stderr, code) = self.run(args);
        assert_ne!(code, 0, "command {args:?} unexpectedly succeeded");
        stderr
    }

    fn new_analysis(&self, kind: &str, name: &str) -> String {
        self.ok(&["analysis", "new", "--kind", kind, "--name", name])
            .trim()
            .to_string()
    }

    /// Answer every question of the catalog's default blocks.
    fn answer_all(&self, id: &str, kind: &str) {
        let catalog: serde_json::Value =
            serde_json::from_str(&self.ok(&["catalog", "show", kind, "--json"])).unwrap();
        for block in catalog.as_array().unwrap().iter().take(6) {
            let block_id = block["id"].as_str().unwrap();
            for (i, q) in block["questions"].as_array().unwrap().iter().enumerate() {
                let value = match q["kind"].as_str().unwrap() {
                    "scale" => "4".to_string(),
                    "text" => "all good".to_string(),
                    _ => q["options"][0].as_str().unwrap().to_string(),
                };
                self.ok(&["answer", "set", id, block_id, &i.to_string(), &value]);
            }
        }
    }
}

#[test]
fn test_catalog_show() {
    let cli = Cli::new();
    let out = cli.ok(&["catalog", "show", "team"]);
    assert!(out.contains("Leadership"));

    let stderr = cli.fails(&["catalog", "show", "finance"]);
    assert!(stderr.starts_with("error:"));
}

#[test]
fn test_analysis_new_and_list() {
    let cli = Cli::new();
    let id = cli.new_analysis("business", "Yearly review");
    assert!(!id.is_empty());

    let listed: serde_json::Value =
        serde_json::from_str(&cli.ok(&["analysis", "list", "--json"])).unwrap();
    let listed = listed.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["analysis_id"], id.as_str());
    assert_eq!(listed[0]["name"], "Yearly review");
}

#[test]
fn test_users_are_isolated() {
    let cli = Cli::new();
    cli.ok(&["--user", "ana", "analysis", "new", "--kind", "team"]);
    let out = cli.ok(&["analysis", "list", "--user", "ben"]);
    assert!(out.contains("no analyses"));
}

#[test]
fn test_first_step_requires_name() {
    let cli = Cli::new();
    let id = cli.ok(&["analysis", "new", "--kind", "team"]).trim().to_string();
    let stderr = cli.fails(&["analysis", "next", &id]);
    assert!(stderr.contains("needs a name"));

    cli.ok(&["analysis", "info", &id, "--name", "Pulse", "--company", "Acme"]);
    let out = cli.ok(&["analysis", "next", &id]);
    assert!(out.contains("Company information"));
}

#[test]
fn test_team_analysis_to_report() {
    let cli = Cli::new();
    let id = cli.new_analysis("team", "Q3 team check");
    for _ in 0..3 {
        cli.ok(&["analysis", "next", &id]);
    }
    let stderr = cli.fails(&["analysis", "next", &id]);
    assert!(stderr.contains("0% complete"));

    cli.answer_all(&id, "team");
    cli.ok(&["analysis", "next", &id]);
    cli.fails(&["analysis", "next", &id]);
    cli.ok(&["analysis", "design", &id, "modern"]);
    let out = cli.ok(&["analysis", "next", &id]);
    assert!(out.contains("analysis submitted"));

    cli.fails(&["answer", "set", &id, "team-growth", "0", "2"]);

    let report: serde_json::Value =
        serde_json::from_str(&cli.ok(&["report", &id, "--json"])).unwrap();
    assert_eq!(report["design"], "modern");
    assert_eq!(report["overall_score"], 80);
}

#[test]
fn test_invalid_answer_is_rejected() {
    let cli = Cli::new();
    let id = cli.new_analysis("team", "Pulse");
    let stderr = cli.fails(&["answer", "set", &id, "team-growth", "0", "9"]);
    assert!(stderr.contains("team-growth"));
    assert_eq!(cli.ok(&["answer", "get", &id, "team-growth", "0"]).trim(), "unanswered");

    cli.ok(&["answer", "set", &id, "team-growth", "0", "5"]);
    assert_eq!(cli.ok(&["answer", "get", &id, "team-growth", "0"]).trim(), "5/5");
}

#[test]
fn test_addon_blocks_need_checkout() {
    let cli = Cli::new();
    let id = cli.new_analysis("business", "Annual");
    cli.ok(&["analysis", "next", &id]);
    cli.ok(&["analysis", "next", &id]);
    cli.ok(&["block", "activate", &id, "business-customers"]);

    let price: serde_json::Value =
        serde_json::from_str(&cli.ok(&["block", "price", &id, "--json"])).unwrap();
    assert_eq!(price["paid_blocks"], 1);
    assert_eq!(price["amount"], 39);

    let out = cli.ok(&["analysis", "next", &id]);
    assert!(out.contains("checkout required"));
    assert!(out.contains("quantity=1"));

    let out = cli.ok(&["checkout", "confirm", &id]);
    assert!(out.contains("Questionnaire"));

    let price: serde_json::Value =
        serde_json::from_str(&cli.ok(&["block", "price", &id, "--json"])).unwrap();
    assert_eq!(price["amount_due"], 0);

    let stderr = cli.fails(&["block", "activate", &id, "business-sustainability"]);
    assert!(stderr.contains("Cannot activate a block"));
}

#[test]
fn test_custom_blocks() {
    let cli = Cli::new();
    let id = cli.new_analysis("team", "Pulse");
    let block_id = cli
        .ok(&["block", "add", &id, "Remote work", "--question", "Tools work well"])
        .trim()
        .to_string();
    assert!(block_id.starts_with("custom-"));

    cli.ok(&["block", "move", &id, &block_id, "0"]);
    let blocks: serde_json::Value =
        serde_json::from_str(&cli.ok(&["block", "list", &id, "--json"])).unwrap();
    assert_eq!(blocks[0]["id"], block_id.as_str());

    cli.fails(&["block", "remove", &id, "team-leadership"]);
    cli.ok(&["block", "remove", &id, &block_id]);
}

#[test]
fn test_config_get_set() {
    let cli = Cli::new();
    assert_eq!(cli.ok(&["config", "get", "pricing.currency"]).trim(), "EUR");
    cli.ok(&["config", "set", "pricing.currency", "USD"]);
    assert_eq!(cli.ok(&["config", "get", "pricing.currency"]).trim(), "USD");
    cli.fails(&["config", "get", "pricing.bogus"]);
}

#[test]
fn test_completions() {
    let cli = Cli::new();
    let out = cli.ok(&["completions", "bash"]);
    assert!(out.contains("reportmii-cli"));
}
