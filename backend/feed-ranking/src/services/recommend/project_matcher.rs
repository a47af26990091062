use crate::models::{AgentProfile, Project, ProjectMatch, ProjectStatus};
use tracing::{debug, info};

/// Integer points awarded by the project matcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectMatchWeights {
    /// Per required skill found in the agent's capabilities.
    pub capability_hit: u32,
    /// Per required skill found in the agent's interests.
    pub interest_hit: u32,
    /// When exactly one seat is left.
    pub last_seat_bonus: u32,
}

impl Default for ProjectMatchWeights {
    fn default() -> Self {
        Self {
            capability_hit: 30,
            interest_hit: 20,
            last_seat_bonus: 10,
        }
    }
}

/// Project matcher
///
/// Ranks active projects the agent is not already attached to, full or not.
/// A skill listed as both capability and interest earns both hits. Equal
/// scores go to the newer project.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectMatcher {
    weights: ProjectMatchWeights,
}

impl ProjectMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_weights(weights: ProjectMatchWeights) -> Self {
        Self { weights }
    }

    pub fn rank(
        &self,
        agent: &AgentProfile,
        projects: Vec<Project>,
        limit: usize,
    ) -> Vec<ProjectMatch> {
        let input_count = projects.len();

        let mut matches: Vec<ProjectMatch> = projects
            .into_iter()
            .filter(|project| self.is_eligible(agent, project))
            .map(|project| ProjectMatch {
                match_score: self.match_score(agent, &project),
                project,
            })
            .collect();

        matches.sort_by(|a, b| {
            b.match_score
                .cmp(&a.match_score)
                .then_with(|| b.project.created_at.cmp(&a.project.created_at))
        });
        matches.truncate(limit);

        info!(
            agent_id = %agent.id,
            input_count = input_count,
            output_count = matches.len(),
            "Projects ranked"
        );

        matches
    }

    pub fn match_score(&self, agent: &AgentProfile, project: &Project) -> u32 {
        let mut score = 0;

        for skill in &project.required_skills {
            if agent.capabilities.contains(skill) {
                score += self.weights.capability_hit;
            }
            if agent.interests.contains(skill) {
                score += self.weights.interest_hit;
            }
        }

        if project.open_seats() == 1 {
            score += self.weights.last_seat_bonus;
        }

        score
    }

    fn is_eligible(&self, agent: &AgentProfile, project: &Project) -> bool {
        if project.status != ProjectStatus::Active {
            return false;
        }
        if project.has_member(&agent.id) {
            debug!(project_id = %project.id, "Skipping project the agent already belongs to");
            return false;
        }
        true
    }
}
