//! Generation context: which prompt template and model identity a run uses.

use std::fmt;

/// Commit message flavor, derived from `--oncall` and `--branch`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GenerationMode {
    Regular,
    Branch,
    Oncall,
    BranchOncall,
}

impl GenerationMode {
    pub const ALL: [GenerationMode; 4] = [
        GenerationMode::Regular,
        GenerationMode::Branch,
        GenerationMode::Oncall,
        GenerationMode::BranchOncall,
    ];

    /// Apply the mode rule: oncall and branch combine, either alone wins, else regular.
    pub fn from_flags(oncall: bool, branch: bool) -> Self {
        match (oncall, branch) {
            (true, true) => GenerationMode::BranchOncall,
            (true, false) => GenerationMode::Oncall,
            (false, true) => GenerationMode::Branch,
            (false, false) => GenerationMode::Regular,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationMode::Regular => "regular",
            GenerationMode::Branch => "branch",
            GenerationMode::Oncall => "oncall",
            GenerationMode::BranchOncall => "branch-oncall",
        }
    }

    /// Whether messages in this mode are scoped by the branch name.
    pub fn uses_branch(&self) -> bool {
        matches!(self, GenerationMode::Branch | GenerationMode::BranchOncall)
    }
}

impl fmt::Display for GenerationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable per-run generation context.
///
/// `branch_name` is only ever set for branch-scoped modes. A branch-scoped
/// context without a name is valid; backends omit the branch line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationContext {
    mode: GenerationMode,
    branch_name: Option<String>,
}

impl GenerationContext {
    pub fn regular() -> Self {
        Self {
            mode: GenerationMode::Regular,
            branch_name: None,
        }
    }

    pub fn mode(&self) -> GenerationMode {
        self.mode
    }

    pub fn branch_name(&self) -> Option<&str> {
        self.branch_name.as_deref()
    }
}

/// Context-relevant CLI flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContextFlags {
    pub oncall: bool,
    pub branch: bool,
}

/// Resolve the generation context.
///
/// `oncall_confirmed` is the answer to the interactive oncall confirmation and
/// is ignored unless `--oncall` was passed. `branch_name` comes from the probe
/// and is dropped for modes that do not use it.
pub fn resolve_context(
    flags: ContextFlags,
    oncall_confirmed: bool,
    branch_name: Option<String>,
) -> GenerationContext {
    let oncall = flags.oncall && oncall_confirmed;
    let mode = GenerationMode::from_flags(oncall, flags.branch);

    let branch_name = if mode.uses_branch() {
        branch_name.filter(|b| !b.trim().is_empty())
    } else {
        None
    };

    GenerationContext { mode, branch_name }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flags(oncall: bool, branch: bool) -> ContextFlags {
        ContextFlags { oncall, branch }
    }

    #[test]
    fn test_mode_rule_covers_all_flag_combinations() {
        assert_eq!(GenerationMode::from_flags(false, false), GenerationMode::Regular);
        assert_eq!(GenerationMode::from_flags(false, true), GenerationMode::Branch);
        assert_eq!(GenerationMode::from_flags(true, false), GenerationMode::Oncall);
        assert_eq!(GenerationMode::from_flags(true, true), GenerationMode::BranchOncall);
    }

    #[test]
    fn test_oncall_branch_confirmed_keeps_branch_name() {
        let ctx = resolve_context(flags(true, true), true, Some("auth-fix".to_string()));
        assert_eq!(ctx.mode(), GenerationMode::BranchOncall);
        assert_eq!(ctx.branch_name(), Some("auth-fix"));
    }

    #[test]
    fn test_declined_oncall_cascades_to_branch() {
        let ctx = resolve_context(flags(true, true), false, Some("auth-fix".to_string()));
        assert_eq!(ctx.mode(), GenerationMode::Branch);
        assert_eq!(ctx.branch_name(), Some("auth-fix"));
    }

    #[test]
    fn test_declined_oncall_without_branch_is_regular() {
        let ctx = resolve_context(flags(true, false), false, None);
        assert_eq!(ctx, GenerationContext::regular());
    }

    #[test]
    fn test_confirmation_ignored_without_oncall_flag() {
        let ctx = resolve_context(flags(false, false), true, None);
        assert_eq!(ctx.mode(), GenerationMode::Regular);
    }

    #[test]
    fn test_oncall_only_drops_branch_name() {
        let ctx = resolve_context(flags(true, false), true, Some("main".to_string()));
        assert_eq!(ctx.mode(), GenerationMode::Oncall);
        assert_eq!(ctx.branch_name(), None);
    }

    #[test]
    fn test_branch_mode_without_known_branch() {
        let ctx = resolve_context(flags(false, true), false, None);
        assert_eq!(ctx.mode(), GenerationMode::Branch);
        assert_eq!(ctx.branch_name(), None);

        let ctx = resolve_context(flags(false, true), false, Some("  ".to_string()));
        assert_eq!(ctx.branch_name(), None);
    }

    #[test]
    fn test_resolution_is_idempotent() {
        for oncall in [false, true] {
            for branch in [false, true] {
                for confirmed in [false, true] {
                    let a = resolve_context(flags(oncall, branch), confirmed, Some("b".into()));
                    let b = resolve_context(flags(oncall, branch), confirmed, Some("b".into()));
                    assert_eq!(a, b);
                }
            }
        }
    }

    #[test]
    fn test_mode_strings() {
        let names: Vec<&str> = GenerationMode::ALL.iter().map(|m| m.as_str()).collect();
        assert_eq!(names, vec!["regular", "branch", "oncall", "branch-oncall"]);
        assert_eq!(GenerationMode::BranchOncall.to_string(), "branch-oncall");
    }
}
