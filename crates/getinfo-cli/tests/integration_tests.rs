//! Integration tests for CLI commands that need no cluster

use std::process::Command;

/// Helper to run kubectl-getinfo with an unusable kubeconfig
fn getinfo(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_kubectl-getinfo"))
        .args(args)
        .env("KUBECONFIG", "/nonexistent/kubeconfig")
        .env_remove("KUBERNETES_SERVICE_HOST")
        .env_remove("KUBERNETES_SERVICE_PORT")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute kubectl-getinfo")
}

mod help {
    use super::*;

    #[test]
    fn test_top_level_help_lists_commands() {
        let output = getinfo(&["--help"]);

        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        for command in ["labels", "annotations", "owner", "scheduling", "completion"] {
            assert!(stdout.contains(command), "help should mention {command}");
        }
    }

    #[test]
    fn test_scheduling_help_lists_fields() {
        let output = getinfo(&["scheduling", "--help"]);

        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("nodeselector"));
        assert!(stdout.contains("topology"));
        assert!(stdout.contains("--all-namespaces"));
    }

    #[test]
    fn test_version() {
        let output = getinfo(&["--version"]);

        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
    }
}

mod completion {
    use super::*;

    #[test]
    fn test_bash_completion() {
        let output = getinfo(&["completion", "bash"]);

        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("kubectl-getinfo"));
        assert!(stdout.contains("scheduling"));
    }

    #[test]
    fn test_unknown_shell_is_usage_error() {
        let output = getinfo(&["completion", "tcsh"]);
        assert_eq!(output.status.code(), Some(64));
    }
}

mod usage_errors {
    use super::*;

    #[test]
    fn test_lone_field_name() {
        let output = getinfo(&["scheduling", "tolerations"]);

        assert_eq!(output.status.code(), Some(64));
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("missing resource type"));
    }

    #[test]
    fn test_missing_resource_type() {
        let output = getinfo(&["labels"]);
        assert_eq!(output.status.code(), Some(64));
    }

    #[test]
    fn test_unsupported_output_format() {
        let output = getinfo(&["labels", "pods", "-o", "xml"]);

        assert_eq!(output.status.code(), Some(64));
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("xml"));
    }

    #[test]
    fn test_unknown_command() {
        let output = getinfo(&["events", "pods"]);
        assert_eq!(output.status.code(), Some(64));
    }
}

mod cluster_errors {
    use super::*;

    #[test]
    fn test_unreachable_cluster() {
        let output = getinfo(&["labels", "pods"]);

        assert_eq!(output.status.code(), Some(3));
        assert!(output.stdout.is_empty());
    }
}
