//! Grouping of running jobs into projects

use crate::jobs::details::RunningJobWithDetails;
use crate::reconcile::get_project_name_from_get_apps;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    pub project_hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    pub job_ids: Vec<u64>,
    pub nodes: Vec<String>,
    pub online_instances: usize,
}

/// Group jobs by project hash, in first-seen order.
///
/// A project's name comes from its jobs when any of them carries one, otherwise
/// from the apps response.
pub fn group_by_project(jobs: &[RunningJobWithDetails], apps: &Value) -> Vec<ProjectSummary> {
    let mut projects: Vec<ProjectSummary> = Vec::new();

    for job in jobs {
        let existing = projects
            .iter()
            .position(|p| p.project_hash == job.project_hash());
        let position = match existing {
            Some(position) => position,
            None => {
                projects.push(ProjectSummary {
                    project_hash: job.project_hash().to_string(),
                    project_name: None,
                    job_ids: Vec::new(),
                    nodes: Vec::new(),
                    online_instances: 0,
                });
                projects.len() - 1
            }
        };

        let project = &mut projects[position];
        project.job_ids.push(job.id());
        project.online_instances += job.online_instances();
        if project.project_name.is_none() {
            project.project_name = job.project_name.clone();
        }
        for node in &job.nodes {
            if !project.nodes.contains(node) {
                project.nodes.push(node.clone());
            }
        }
    }

    for project in projects.iter_mut().filter(|p| p.project_name.is_none()) {
        project.project_name = get_project_name_from_get_apps(apps, &project.project_hash);
    }

    projects
}
