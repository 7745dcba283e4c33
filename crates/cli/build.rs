use std::process::Command;

/// Short commit id of the checkout, `-dirty` suffixed when the tree has edits.
fn git_revision() -> Option<String> {
    let out = Command::new("git")
        .args(["describe", "--always", "--dirty", "--abbrev=7", "--exclude=*"])
        .output()
        .ok()?;
    if !out.status.success() {
        return None;
    }
    let rev = String::from_utf8(out.stdout).ok()?;
    let rev = rev.trim();
    (!rev.is_empty()).then(|| rev.to_string())
}

fn cargo_env(name: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| "unknown".into())
}

fn main() {
    for watched in ["../../.git/HEAD", "../../.git/refs/heads", "../../.git/index"] {
        println!("cargo:rerun-if-changed={watched}");
    }

    let stamps = [
        ("GIT_COMMIT_HASH", git_revision().unwrap_or_else(|| "unknown".into())),
        ("TARGET", cargo_env("TARGET")),
        ("PROFILE_NAME", cargo_env("PROFILE")),
    ];
    for (key, value) in stamps {
        println!("cargo:rustc-env={key}={value}");
    }
}
