//! Hierarchical document classification: Domain → Category.
//!
//! Classification runs in three stages, each short-circuiting the next:
//!
//! 1. Guardrail rules - an ordered list of keyword groups that force an exact
//!    domain/category for file types prone to misclassification (IDs, tax
//!    forms, resumes, UAV specs, ...).
//! 2. Extension shortcuts - known source/markup extensions map straight to
//!    `Code`/`Documentation` without scoring.
//! 3. Keyword scoring - strong keywords count double, weak keywords count
//!    once, and a filename match adds a flat bonus. Domain and category
//!    confidence are fused as `0.6 * domain + 0.4 * category`.
//!
//! If the fused confidence falls below [`LLM_FALLBACK_THRESHOLD`], callers
//! should escalate to an [`crate::llm::LlmClient`] for a final judgment.

mod taxonomy;

pub use taxonomy::{Domain, builtin_domains};

use serde::{Deserialize, Serialize};

/// Confidence threshold below which the rule-based classifier defers to an LLM.
pub const LLM_FALLBACK_THRESHOLD: f32 = 0.45;

/// Category assigned within a domain.
pub type Category = String;

/// Result of classifying a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    /// Top-level domain (e.g. "Healthcare", "Code").
    pub domain: String,
    /// Category within the domain (e.g. "Clinical", "Backend").
    pub category: Category,
    /// Lowercased file extension used during classification (empty if none).
    pub extension: String,
    /// Fused confidence in `[0.0, 1.0]`.
    pub confidence: f32,
    /// Raw score of the winning domain before fusion.
    pub domain_score: i64,
    /// Raw score of the winning category before fusion.
    pub category_score: i64,
    /// Whether a guardrail rule or extension shortcut forced this result.
    pub forced: bool,
}

struct GuardrailRule {
    domain: &'static str,
    category: &'static str,
    keywords: &'static [&'static str],
}

/// Ordered guardrail rules, checked before keyword scoring. The first rule
/// whose keyword appears in the text or filename wins.
const GUARDRAIL_RULES: &[GuardrailRule] = &[
    GuardrailRule {
        domain: "Government",
        category: "ID",
        keywords: &["aadhaar", "pan card", "passport", "driving license", "voter id", "uidai"],
    },
    GuardrailRule {
        domain: "Government",
        category: "Tax",
        keywords: &["form 16", "itr-v", "income tax return", "computation of income"],
    },
    GuardrailRule {
        domain: "Personal",
        category: "Identity",
        keywords: &["curriculum vitae", "resume", "biodata"],
    },
    GuardrailRule {
        domain: "Personal",
        category: "Bills",
        keywords: &["electricity bill", "gas bill", "credit card statement"],
    },
    GuardrailRule {
        domain: "Technology",
        category: "UAV",
        keywords: &["uav", "drone", "quadcopter", "aerial", "hexacopter"],
    },
    GuardrailRule {
        domain: "Technology",
        category: "API",
        keywords: &[
            "openapi", "swagger", "graphql", "grpc", "raml", "api gateway", "rest api",
            "api documentation", "http method",
        ],
    },
    GuardrailRule {
        domain: "Technology",
        category: "DevOps",
        keywords: &[
            "docker", "kubernetes", "k8s", "jenkins", "terraform", "ansible", "helm",
            "github actions", "gitlab ci", "ci/cd",
        ],
    },
    GuardrailRule {
        domain: "Code",
        category: "Frontend",
        keywords: &["react", "jsx", "tsx", "nextjs", "<html", "<!doctype", "tailwind", "redux", "vue", "angular"],
    },
    GuardrailRule {
        domain: "Code",
        category: "Backend",
        keywords: &["express", "django", "flask", "fastapi", "spring boot", "server", "middleware", "controller"],
    },
    GuardrailRule {
        domain: "Healthcare",
        category: "LabReport",
        keywords: &["pathology report", "blood test", "lipid profile", "cbc", "urine analysis"],
    },
    GuardrailRule {
        domain: "Healthcare",
        category: "Clinical",
        keywords: &["discharge summary", "opd paper", "prescription", "admission form"],
    },
    GuardrailRule {
        domain: "School",
        category: "Admin",
        keywords: &["leaving certificate", "bonafide", "transfer certificate", "result sheet", "report card"],
    },
    GuardrailRule {
        domain: "College",
        category: "Admin",
        keywords: &["transcript", "degree certificate", "provisional certificate", "migration certificate"],
    },
    GuardrailRule {
        domain: "Company",
        category: "Product",
        keywords: &["product requirements", "prd", "user story", "sprint backlog", "release notes"],
    },
    GuardrailRule {
        domain: "Company",
        category: "Service",
        keywords: &["statement of work", "sow", "service level agreement", "sla", "client proposal"],
    },
    GuardrailRule {
        domain: "Finance",
        category: "Tax",
        keywords: &["gst", "tax invoice", "tax return"],
    },
    GuardrailRule {
        domain: "Legal",
        category: "Contract",
        keywords: &["non-disclosure agreement", "nda", "consulting agreement", "employment agreement"],
    },
];

/// Source-code extensions routed directly to the `Code` domain.
const CODE_EXTENSIONS: &[&str] = &[
    "py", "js", "jsx", "ts", "tsx", "java", "cpp", "c", "h", "hpp", "cs", "go", "rs", "rb", "php",
    "swift", "kt", "scala", "sh", "bash", "ps1", "bat", "cmd", "sql", "r", "dart", "lua",
];

/// Extensions within [`CODE_EXTENSIONS`] that lean frontend.
const FRONTEND_EXTENSIONS: &[&str] = &["js", "jsx", "ts", "tsx", "html", "css", "scss", "sass", "vue"];

/// Extensions within [`CODE_EXTENSIONS`] that lean backend.
const BACKEND_EXTENSIONS: &[&str] = &["py", "java", "go", "php", "rb", "rs", "cs"];

/// Markup extensions routed directly to `Documentation/Other`.
const DOC_EXTENSIONS: &[&str] = &["md", "rst", "adoc"];

fn extension_of(filename: &str) -> Option<&str> {
    filename.rsplit('.').next().filter(|ext| *ext != filename)
}

fn guardrail_classify(text_lower: &str, filename_lower: &str, ext: &str) -> Option<Classification> {
    for rule in GUARDRAIL_RULES {
        if rule
            .keywords
            .iter()
            .any(|kw| text_lower.contains(kw) || filename_lower.contains(kw))
        {
            return Some(Classification {
                domain: rule.domain.to_string(),
                category: rule.category.to_string(),
                extension: ext.to_string(),
                confidence: 0.95,
                domain_score: 100,
                category_score: 100,
                forced: true,
            });
        }
    }

    if CODE_EXTENSIONS.contains(&ext) {
        let category = if FRONTEND_EXTENSIONS.contains(&ext) {
            "Frontend"
        } else if BACKEND_EXTENSIONS.contains(&ext) {
            "Backend"
        } else {
            "Script"
        };
        return Some(Classification {
            domain: "Code".to_string(),
            category: category.to_string(),
            extension: ext.to_string(),
            confidence: 0.95,
            domain_score: 100,
            category_score: 100,
            forced: true,
        });
    }

    if DOC_EXTENSIONS.contains(&ext) {
        return Some(Classification {
            domain: "Documentation".to_string(),
            category: "Other".to_string(),
            extension: ext.to_string(),
            confidence: 0.85,
            domain_score: 100,
            category_score: 100,
            forced: true,
        });
    }

    None
}

/// Counts (possibly overlapping-free, left-to-right) non-overlapping
/// occurrences of `needle` in `haystack`, mirroring Python's `str.count`.
fn count_occurrences(haystack: &str, needle: &str) -> usize {
    if needle.is_empty() {
        return 0;
    }
    haystack.matches(needle).count()
}

/// Classifies `text` (with optional `filename` context) into a domain and
/// category, falling back to keyword scoring when no guardrail rule or
/// extension shortcut applies.
#[must_use]
pub fn classify_hierarchical(text: &str, filename: &str) -> Classification {
    let text_lower = text.to_lowercase();
    let filename_lower = filename.to_lowercase();
    let extension = extension_of(filename).map(str::to_lowercase).unwrap_or_default();

    if let Some(forced) = guardrail_classify(&text_lower, &filename_lower, &extension) {
        return forced;
    }

    let domains = builtin_domains();

    let mut domain_scores: Vec<(&str, i64)> = Vec::with_capacity(domains.len());
    for domain in &domains {
        let mut score: i64 = 0;
        for kw in domain.strong_keywords {
            score += count_occurrences(&text_lower, kw) as i64 * 2;
            if filename_lower.contains(kw) {
                score += 5;
            }
        }
        for kw in domain.weak_keywords {
            score += count_occurrences(&text_lower, kw) as i64;
        }
        domain_scores.push((domain.name, score));
    }

    let (mut best_domain, mut best_domain_score) = domain_scores[0];
    for &(name, score) in &domain_scores[1..] {
        if score > best_domain_score {
            best_domain = name;
            best_domain_score = score;
        }
    }
    if best_domain_score == 0 {
        best_domain = "Technology";
        best_domain_score = 0;
    }

    let category_keywords = domains
        .iter()
        .find(|d| d.name == best_domain)
        .map(|d| d.categories)
        .unwrap_or(&[]);

    let mut category_scores: Vec<(&str, i64)> = Vec::with_capacity(category_keywords.len());
    for cat in category_keywords {
        if cat.name == "Other" {
            continue;
        }
        let mut score: i64 = 0;
        for kw in cat.keywords {
            score += count_occurrences(&text_lower, kw) as i64;
            if filename_lower.contains(kw) {
                score += 5;
            }
        }
        category_scores.push((cat.name, score));
    }

    let (mut best_category, mut best_category_score) = category_scores
        .first()
        .copied()
        .unwrap_or(("Other", 0));
    for &(name, score) in category_scores.iter().skip(1) {
        if score > best_category_score {
            best_category = name;
            best_category_score = score;
        }
    }
    if best_category_score == 0 {
        best_category = "Other";
    }

    let total_domain_score: i64 = domain_scores.iter().map(|(_, s)| s).sum();
    let domain_confidence = if total_domain_score > 0 {
        best_domain_score as f32 / total_domain_score as f32
    } else {
        0.0
    };

    let total_category_score: i64 = category_scores.iter().map(|(_, s)| s).sum();
    let category_confidence = if total_category_score > 0 {
        best_category_score as f32 / total_category_score as f32
    } else {
        0.0
    };

    let combined = ((domain_confidence * 0.6) + (category_confidence * 0.4)).min(1.0);
    let confidence = (combined * 100.0).round() / 100.0;

    Classification {
        domain: best_domain.to_string(),
        category: best_category.to_string(),
        extension,
        confidence,
        domain_score: best_domain_score,
        category_score: best_category_score,
        forced: false,
    }
}
