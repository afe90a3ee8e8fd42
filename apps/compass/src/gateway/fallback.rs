// Built-in content served when the generation service is unreachable or
// returns something unusable. The user always gets something to look at.

use crate::gateway::recommendations::Recommendations;
use crate::models::career::{CareerPath, RoadmapStep};
use crate::models::dashboard::{DashboardContent, Event, Goal, LearningPath, Opportunity};

fn step(title: &str, duration: &str) -> RoadmapStep {
    RoadmapStep {
        title: title.to_string(),
        description: None,
        duration: Some(duration.to_string()),
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub fn default_recommendations() -> Recommendations {
    Recommendations {
        career_paths: vec![
            CareerPath {
                id: 1,
                title: "Software Engineer".to_string(),
                description: "Design, build and maintain software systems.".to_string(),
                salary_range: Some("$85,000 - $150,000".to_string()),
                match_score: 85.0,
                required_skills: strings(&["Programming", "Data structures", "Version control"]),
                certifications: strings(&["AWS Certified Developer"]),
                roadmap: vec![
                    step("Master one general-purpose language", "3 months"),
                    step("Build and publish two portfolio projects", "4 months"),
                    step("Practice system design and interviews", "2 months"),
                ],
            },
            CareerPath {
                id: 2,
                title: "Data Analyst".to_string(),
                description: "Turn raw data into decisions with analysis and reporting."
                    .to_string(),
                salary_range: Some("$65,000 - $110,000".to_string()),
                match_score: 78.0,
                required_skills: strings(&["SQL", "Spreadsheets", "Statistics", "Visualization"]),
                certifications: strings(&["Google Data Analytics Certificate"]),
                roadmap: vec![
                    step("Learn SQL and spreadsheet modelling", "2 months"),
                    step("Complete a statistics fundamentals course", "2 months"),
                    step("Publish a dashboard case study", "1 month"),
                ],
            },
            CareerPath {
                id: 3,
                title: "Product Manager".to_string(),
                description: "Own a product's direction from discovery to delivery.".to_string(),
                salary_range: Some("$90,000 - $160,000".to_string()),
                match_score: 72.0,
                required_skills: strings(&["Communication", "Prioritization", "User research"]),
                certifications: strings(&["Certified Scrum Product Owner"]),
                roadmap: vec![
                    step("Shadow a product team or run a side project", "3 months"),
                    step("Learn discovery and roadmapping frameworks", "2 months"),
                    step("Lead a feature from idea to launch", "4 months"),
                ],
            },
        ],
        summary: Some(
            "We couldn't personalize recommendations right now, \
             so here are popular paths to explore."
                .to_string(),
        ),
        skill_gaps: vec![],
    }
}

/// Generic dashboard content built from the path's own skills and certifications.
pub fn default_dashboard(path: &CareerPath) -> DashboardContent {
    let mut learning_paths: Vec<LearningPath> = path
        .required_skills
        .iter()
        .take(3)
        .map(|skill| LearningPath {
            title: format!("{skill} fundamentals"),
            provider: None,
            duration: Some("4 weeks".to_string()),
            url: None,
        })
        .collect();
    learning_paths.extend(path.certifications.iter().take(1).map(|cert| LearningPath {
        title: format!("Prepare for {cert}"),
        provider: None,
        duration: Some("8 weeks".to_string()),
        url: None,
    }));

    let goals = path
        .roadmap
        .iter()
        .map(|s| Goal {
            title: s.title.clone(),
            target_date: None,
            completed: false,
        })
        .collect();

    DashboardContent {
        learning_paths,
        opportunities: vec![Opportunity {
            title: format!("Entry-level {} roles", path.title),
            organization: None,
            kind: Some("job".to_string()),
            url: None,
        }],
        goals,
        events: vec![Event {
            title: format!("{} community meetup", path.title),
            date: None,
            location: Some("Online".to_string()),
        }],
    }
}
