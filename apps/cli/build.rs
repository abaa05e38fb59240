use std::process::Command;

/// First line of `git <args>`, if git is available and succeeds.
fn git(args: &[&str]) -> Option<String> {
    let out = Command::new("git").args(args).output().ok()?;
    if !out.status.success() {
        return None;
    }
    let text = String::from_utf8(out.stdout).ok()?;
    let line = text.lines().next()?.trim().to_string();
    (!line.is_empty()).then_some(line)
}

fn main() {
    let sha = git(&["rev-parse", "--short=10", "HEAD"]).unwrap_or_else(|| "dev".into());
    let dirty = git(&["status", "--porcelain", "--untracked-files=no"]).is_some();
    let version = if dirty { format!("{sha}-dirty") } else { sha };
    println!("cargo:rustc-env=ASCEND_BUILD={version}");
    println!("cargo:rerun-if-changed=.git/HEAD");
}
