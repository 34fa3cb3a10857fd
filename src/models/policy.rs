use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct Policy {
    pub id: u32,
    pub title: &'static str,
    pub description: &'static str,
    pub link: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PolicyCategory {
    pub name: &'static str,
    pub policies: Vec<Policy>,
}

/// Recently published policy shown in the first-visit banner
#[derive(Debug, Clone, PartialEq)]
pub struct NewPolicy {
    pub id: u32,
    pub title: &'static str,
    pub category: &'static str,
    pub added: NaiveDate,
    pub description: &'static str,
}

impl NewPolicy {
    pub fn added_label(&self) -> String {
        self.added.format("%-m/%-d/%Y").to_string()
    }
}

fn policy(id: u32, title: &'static str, description: &'static str, link: &'static str) -> Policy {
    Policy { id, title, description, link }
}

pub fn policy_catalog() -> Vec<PolicyCategory> {
    vec![
        PolicyCategory {
            name: "HR Policies",
            policies: vec![
                policy(1, "Employee Handbook", "Company policies, procedures, and expectations for all employees.", "#handbook"),
                policy(2, "Remote Work Policy", "Working from home: equipment, schedules, and communication.", "#remote-work"),
                policy(3, "Time Off Policy", "Vacation, sick leave, and personal time off requests.", "#time-off"),
                policy(4, "Code of Conduct", "Ethical guidelines and behavioral expectations.", "#code-conduct"),
            ],
        },
        PolicyCategory {
            name: "IT Security",
            policies: vec![
                policy(5, "Password Security Guidelines", "Creating and managing secure passwords across company systems.", "#password-security"),
                policy(6, "Data Protection Policy", "Handling sensitive company and customer data.", "#data-protection"),
                policy(7, "Device Usage Policy", "Using company and personal devices for work.", "#device-usage"),
            ],
        },
        PolicyCategory {
            name: "Safety & Compliance",
            policies: vec![
                policy(8, "Workplace Safety Guidelines", "Safety procedures, emergency protocols, and accident reporting.", "#workplace-safety"),
                policy(9, "Anti-Harassment Policy", "Zero tolerance for harassment and discrimination.", "#anti-harassment"),
                policy(10, "Environmental Policy", "Environmental responsibility and sustainable practices.", "#environmental"),
            ],
        },
        PolicyCategory {
            name: "Benefits & Compensation",
            policies: vec![
                policy(11, "Health Insurance Guide", "Coverage options and enrollment procedures.", "#health-insurance"),
                policy(12, "Retirement Plan Information", "Retirement plans, company matching, and planning resources.", "#retirement"),
                policy(13, "Professional Development Policy", "Training, education reimbursement, and career advancement.", "#professional-development"),
            ],
        },
    ]
}

pub fn newly_added_policies() -> Vec<NewPolicy> {
    let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default();
    vec![
        NewPolicy {
            id: 1,
            title: "Remote Work Policy Update",
            category: "HR Policies",
            added: date(2024, 6, 20),
            description: "Updated guidelines for remote work arrangements and hybrid schedules.",
        },
        NewPolicy {
            id: 2,
            title: "Cybersecurity Best Practices",
            category: "IT Security",
            added: date(2024, 6, 18),
            description: "New security protocols and password requirements for all employees.",
        },
        NewPolicy {
            id: 3,
            title: "Health & Safety Guidelines",
            category: "Safety",
            added: date(2024, 6, 15),
            description: "Updated workplace safety measures and emergency procedures.",
        },
    ]
}
