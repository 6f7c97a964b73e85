//! Formation lifecycle - ad-hoc agent teams

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::OrchestraError;
use crate::roster::AgentKey;
use crate::state::{AgentActivity, Formation, FormationPattern, FormationStatus, OrchestraState};

impl OrchestraState {
    /// Form a new team of agents around a stated purpose
    ///
    /// Members are deduped preserving order and must be non-empty. The
    /// formation starts out active immediately; members switch to
    /// collaborative. The connector journals one insight announcing it.
    pub fn create_formation(
        &mut self,
        name: impl Into<String>,
        pattern: FormationPattern,
        members: Vec<AgentKey>,
        purpose: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<Uuid, OrchestraError> {
        let mut deduped: Vec<AgentKey> = Vec::with_capacity(members.len());
        for key in members {
            // Reject keys missing from the document before mutating anything.
            if !self.agents.contains_key(&key) {
                return Err(OrchestraError::AgentNotFound(key.key().to_string()));
            }
            if !deduped.contains(&key) {
                deduped.push(key);
            }
        }
        if deduped.is_empty() {
            return Err(OrchestraError::InvalidFormation("member list is empty".to_string()));
        }

        let name = name.into();
        let purpose = purpose.into();

        if deduped.len() != pattern.expected_members() {
            warn!(
                formation = %name,
                pattern = ?pattern,
                expected = pattern.expected_members(),
                actual = deduped.len(),
                "Formation member count does not match pattern"
            );
        }

        let formation = Formation {
            id: Uuid::new_v4(),
            name: name.clone(),
            pattern,
            members: deduped.clone(),
            purpose: purpose.clone(),
            status: FormationStatus::Active,
            formed_at: now,
        };
        let id = formation.id;

        for key in &deduped {
            if let Some(profile) = self.agents.get_mut(key) {
                profile.activity = AgentActivity::Collaborative;
            }
        }

        self.formations.push(formation);

        let roll_call = deduped
            .iter()
            .map(|k| k.descriptor().name)
            .collect::<Vec<_>>()
            .join(", ");
        self.add_insight(
            AgentKey::CONNECTOR,
            format!("Formation '{name}' takes the stage: {roll_call}. Purpose: {purpose}"),
            now,
        );

        info!(formation_id = %id, name = %name, members = deduped.len(), "Formation created");
        Ok(id)
    }

    /// Dissolve a formation: complete it and remove it in one transaction
    ///
    /// Members return to active; a plain thought announces the dissolution.
    /// An unknown id is a typed failure with no mutation.
    pub fn dissolve_formation(
        &mut self,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<(), OrchestraError> {
        let index = self
            .formations
            .iter()
            .position(|f| f.id == id)
            .ok_or(OrchestraError::FormationNotFound(id))?;

        let mut formation = self.formations.remove(index);
        formation.status = FormationStatus::Complete;

        for key in &formation.members {
            if let Some(profile) = self.agents.get_mut(key) {
                profile.activity = AgentActivity::Active;
            }
        }

        self.add_thought(
            AgentKey::CONNECTOR,
            format!("Formation '{}' takes a bow and disbands.", formation.name),
            crate::state::MessageKind::Thought,
            now,
        );

        info!(formation_id = %id, name = %formation.name, "Formation dissolved");
        Ok(())
    }
}
