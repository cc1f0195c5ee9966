// ==========================================
// Asset Back Office - Capability Checks
// ==========================================
// The import engine only asks one question of the outer system:
// may this actor run a bulk import. Callers plug in their own
// policy through the trait.
// ==========================================

/// Capability required to run bulk asset imports.
pub const CAPABILITY_ASSET_IMPORT: &str = "assets.import";

pub trait CapabilityCheck: Send + Sync {
    fn allows(&self, actor: &str, capability: &str) -> bool;
}

/// Policy that grants everything. Used by the CLI and by tests
/// that exercise the pipeline rather than authorization.
pub struct AllowAll;

impl CapabilityCheck for AllowAll {
    fn allows(&self, _actor: &str, _capability: &str) -> bool {
        true
    }
}

/// Policy backed by an explicit actor list.
pub struct ActorAllowList {
    actors: Vec<String>,
}

impl ActorAllowList {
    pub fn new(actors: Vec<String>) -> Self {
        ActorAllowList { actors }
    }
}

impl CapabilityCheck for ActorAllowList {
    fn allows(&self, actor: &str, capability: &str) -> bool {
        capability == CAPABILITY_ASSET_IMPORT && self.actors.iter().any(|a| a == actor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allow_list_only_grants_listed_actors() {
        let policy = ActorAllowList::new(vec!["ana".to_string()]);
        assert!(policy.allows("ana", CAPABILITY_ASSET_IMPORT));
        assert!(!policy.allows("luis", CAPABILITY_ASSET_IMPORT));
        assert!(!policy.allows("ana", "assets.delete"));
    }
}
