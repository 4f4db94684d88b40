//! Simulated `git`.

const RESPONSES: &[(&str, &str)] = &[
    (
        "git status",
        r#"On branch main
Your branch is up to date with 'origin/main'.

Changes not staged for commit:
  (use "git add <file>..." to update what will be committed)
  (use "git checkout -- <file>..." to discard changes in working directory)

        modified:   docker-compose.yml
        modified:   k8s/deployment.yaml

no changes added to commit (use "git add ." or "git commit -a")"#,
    ),
    (
        "git log --oneline",
        "a1b2c3d (HEAD -> main, origin/main) Add Kubernetes deployment manifests
e4f5g6h Update Docker Compose configuration
i7j8k9l Initial microservice implementation
m0n1o2p Add CI/CD pipeline configuration",
    ),
];

/// Canned output for a `git` line.
pub fn respond(line: &str) -> String {
    super::lookup(RESPONSES, line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_lists_four_commits() {
        let output = respond("git log --oneline");
        assert_eq!(output.lines().count(), 4);
        assert!(output.starts_with("a1b2c3d (HEAD -> main"));
    }

    #[test]
    fn status_mentions_modified_manifests() {
        assert!(respond("git status").contains("modified:   k8s/deployment.yaml"));
    }

    #[test]
    fn push_is_acknowledged() {
        assert_eq!(
            respond("git push origin main"),
            "✅ Executed: git push origin main"
        );
    }
}
