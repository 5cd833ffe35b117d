//! Role-based file access control.
//!
//! Maps roles to the domains and categories they may see. The built-in role
//! table mirrors a fixed set of job functions (Admin, Manager, Teacher, ...);
//! custom roles can be defined at runtime and persisted via [`crate::storage`].

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Either every value is allowed (`*`) or only the listed set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AccessSet {
    /// Wildcard: unrestricted.
    Any,
    /// Only these values are permitted.
    Some(HashSet<String>),
}

impl AccessSet {
    fn contains(&self, value: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Some(set) => set.contains(value),
        }
    }

    fn some(values: &[&str]) -> Self {
        Self::Some(values.iter().map(|s| (*s).to_string()).collect())
    }
}

/// A role's file access configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    /// Role name (e.g. "Student", "Nurse").
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Domains this role may read. `AccessSet::Any` grants every domain.
    pub allowed_domains: AccessSet,
    /// When set, narrows access within an allowed domain to these categories.
    pub allowed_categories: Option<AccessSet>,
    /// Categories this role is denied regardless of `allowed_categories`.
    pub denied_categories: HashSet<String>,
    /// Operation capability strings granted to this role (e.g.
    /// `files.upload`, `files.delete.own`). `AccessSet::Any` is the `*`
    /// wildcard, granting every capability.
    #[serde(default = "default_capabilities")]
    pub capabilities: AccessSet,
    /// Whether this is one of the built-in roles seeded at `init` time.
    pub is_builtin: bool,
}

fn default_capabilities() -> AccessSet {
    AccessSet::some(&[])
}

impl Role {
    #[allow(clippy::too_many_arguments)]
    fn builtin(
        name: &str,
        description: &str,
        allowed_domains: AccessSet,
        allowed_categories: Option<AccessSet>,
        denied_categories: &[&str],
        capabilities: AccessSet,
    ) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            allowed_domains,
            allowed_categories,
            denied_categories: denied_categories.iter().map(|s| (*s).to_string()).collect(),
            capabilities,
            is_builtin: true,
        }
    }
}

/// Capability strings granted to every built-in non-admin role by default.
const BASE_CAPABILITIES: &[&str] = &["files.upload", "files.delete.own", "files.download"];

/// Returns the fixed set of roles seeded into a fresh database.
#[must_use]
pub fn builtin_roles() -> Vec<Role> {
    vec![
        Role::builtin("Admin", "Full access to all files", AccessSet::Any, None, &[], AccessSet::Any),
        Role::builtin(
            "Manager",
            "Business and company files",
            AccessSet::some(&["Company", "Business", "Finance", "Technology"]),
            None,
            &["Personal", "Medical"],
            AccessSet::some(&[
                "files.upload",
                "files.delete.own",
                "files.delete.all",
                "files.download",
                "admin.dashboard",
                "analytics.view",
            ]),
        ),
        Role::builtin(
            "Teacher",
            "Educational content, no admin records",
            AccessSet::some(&["Education", "School", "College", "ResearchPaper", "Technology"]),
            None,
            &["Admin", "HR", "Finance"],
            AccessSet::some(BASE_CAPABILITIES),
        ),
        Role::builtin(
            "Student",
            "Course materials only, no admin access",
            AccessSet::some(&["Education", "School", "College", "Technology"]),
            None,
            &["Admin", "Placement", "HR"],
            AccessSet::some(BASE_CAPABILITIES),
        ),
        Role::builtin(
            "Doctor",
            "All healthcare and research files",
            AccessSet::some(&["Healthcare", "ResearchPaper"]),
            None,
            &[],
            AccessSet::some(&[
                "files.upload",
                "files.delete.own",
                "files.download",
                "files.view_duplicates",
            ]),
        ),
        Role::builtin(
            "Nurse",
            "Patient files only, no admin/finance",
            AccessSet::some(&["Healthcare"]),
            Some(AccessSet::some(&["Clinical", "LabReport", "Imaging"])),
            &["Finance", "Admin", "HR"],
            AccessSet::some(BASE_CAPABILITIES),
        ),
        Role::builtin(
            "Accountant",
            "Financial documents only",
            AccessSet::some(&["Finance", "Company"]),
            Some(AccessSet::some(&["Accounting", "Tax", "Payroll"])),
            &["Personal", "Medical"],
            AccessSet::some(&["files.upload", "files.delete.own", "files.download", "analytics.view"]),
        ),
        Role::builtin(
            "HR",
            "HR and employee files",
            AccessSet::some(&["Company"]),
            Some(AccessSet::some(&["HR", "Payroll"])),
            &["Finance", "Medical", "Product"],
            AccessSet::some(&[
                "files.upload",
                "files.delete.own",
                "files.delete.all",
                "files.download",
                "categories.create",
                "categories.delete",
            ]),
        ),
        Role::builtin(
            "Developer",
            "Technical and code files",
            AccessSet::some(&["Technology", "Code", "Documentation"]),
            None,
            &["Finance", "HR", "Personal"],
            AccessSet::some(&[
                "files.upload",
                "files.delete.own",
                "files.download",
                "files.view_duplicates",
                "files.delete_duplicates",
            ]),
        ),
    ]
}

/// Checks whether `role` may access a file classified as `domain`/`category`.
///
/// Mirrors the upstream access check: admins bypass everything, otherwise the
/// domain must be allowed, the category must not be denied, and if an explicit
/// allow-list of categories exists the category must appear in it.
#[must_use]
pub fn access(role: &Role, domain: &str, category: &str) -> bool {
    if role.allowed_domains == AccessSet::Any {
        return true;
    }
    if !role.allowed_domains.contains(domain) {
        return false;
    }
    if role.denied_categories.contains(category) {
        return false;
    }
    if let Some(allowed) = &role.allowed_categories
        && !allowed.contains(category)
    {
        return false;
    }
    true
}

/// Checks whether `role` carries the operation capability string
/// `capability` (e.g. `"files.delete.all"`). A role with the `*` wildcard
/// capability grants every capability.
#[must_use]
pub fn has_capability(role: &Role, capability: &str) -> bool {
    role.capabilities.contains(capability)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn role(name: &str) -> Role {
        builtin_roles().into_iter().find(|r| r.name == name).unwrap()
    }

    #[test]
    fn admin_sees_everything() {
        let admin = role("Admin");
        assert!(access(&admin, "Healthcare", "Clinical"));
        assert!(access(&admin, "Finance", "Payroll"));
    }

    #[test]
    fn student_denied_admin_category() {
        let student = role("Student");
        assert!(access(&student, "Education", "Syllabus"));
        assert!(!access(&student, "Education", "Admin"));
        assert!(!access(&student, "Finance", "Payroll"));
    }

    #[test]
    fn nurse_restricted_to_clinical_categories() {
        let nurse = role("Nurse");
        assert!(access(&nurse, "Healthcare", "Clinical"));
        assert!(!access(&nurse, "Healthcare", "Billing"));
        assert!(!access(&nurse, "Finance", "Clinical"));
    }

    #[test]
    fn accountant_denied_personal_even_within_finance() {
        let accountant = role("Accountant");
        assert!(access(&accountant, "Finance", "Tax"));
        assert!(!access(&accountant, "Finance", "Personal"));
    }

    #[test]
    fn builtin_roles_cover_nine_roles() {
        assert_eq!(builtin_roles().len(), 9);
    }

    #[test]
    fn admin_wildcard_grants_every_capability() {
        let admin = role("Admin");
        assert!(has_capability(&admin, "files.delete.all"));
        assert!(has_capability(&admin, "categories.create"));
        assert!(has_capability(&admin, "anything.at.all"));
    }

    #[test]
    fn student_lacks_delete_all_capability() {
        let student = role("Student");
        assert!(has_capability(&student, "files.upload"));
        assert!(has_capability(&student, "files.delete.own"));
        assert!(!has_capability(&student, "files.delete.all"));
    }

    #[test]
    fn manager_has_delete_all_capability() {
        let manager = role("Manager");
        assert!(has_capability(&manager, "files.delete.all"));
        assert!(has_capability(&manager, "analytics.view"));
    }
}
