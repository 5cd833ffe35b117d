//! Domain/category keyword tables used by the hierarchical classifier.

/// A category and the keywords that count toward it within its domain.
pub struct CategoryKeywords {
    /// Category name.
    pub name: &'static str,
    /// Keywords scored within this category.
    pub keywords: &'static [&'static str],
}

/// A top-level domain: its scoring keywords and the categories it contains.
pub struct Domain {
    /// Domain name (e.g. "Healthcare").
    pub name: &'static str,
    /// Keywords worth double weight.
    pub strong_keywords: &'static [&'static str],
    /// Keywords worth single weight.
    pub weak_keywords: &'static [&'static str],
    /// Categories scored within this domain (excluding the implicit "Other").
    pub categories: &'static [CategoryKeywords],
}

const TECHNOLOGY_CATEGORIES: &[CategoryKeywords] = &[
    CategoryKeywords { name: "UAV", keywords: &["uav", "drone", "unmanned aerial", "unmanned", "quadcopter", "hexacopter", "flight"] },
    CategoryKeywords { name: "Web", keywords: &["web", "website", "web app", "web application", "web development", "full stack"] },
    CategoryKeywords { name: "Database", keywords: &["database", "sql", "nosql", "mongodb", "postgres", "mysql", "redis"] },
    CategoryKeywords { name: "API", keywords: &["api", "endpoint", "rest", "graphql", "grpc", "swagger", "openapi"] },
    CategoryKeywords { name: "DevOps", keywords: &["docker", "kubernetes", "ci/cd", "jenkins", "terraform", "ansible", "cloud"] },
    CategoryKeywords { name: "AI", keywords: &["artificial intelligence", "ai", "machine learning", "deep learning", "llm", "neural network"] },
    CategoryKeywords { name: "Security", keywords: &["security", "encryption", "ssl", "tls", "auth", "firewall", "cyber", "cipher", "crypto", "aes", "rsa"] },
    CategoryKeywords { name: "Mobile", keywords: &["mobile", "ios", "android", "flutter", "react native", "app"] },
];

const CODE_CATEGORIES: &[CategoryKeywords] = &[
    CategoryKeywords { name: "Backend", keywords: &["backend", "server", "api", "database", "express", "django", "flask", "spring", "sql"] },
    CategoryKeywords { name: "Frontend", keywords: &["frontend", "ui", "react", "vue", "angular", "html", "css", "component"] },
    CategoryKeywords { name: "Algorithm", keywords: &["algorithm", "data structure", "sorting", "searching", "graph", "tree"] },
    CategoryKeywords { name: "Testing", keywords: &["test", "unit test", "integration test", "jest", "pytest", "coverage"] },
];

const FINANCE_CATEGORIES: &[CategoryKeywords] = &[
    CategoryKeywords { name: "Accounting", keywords: &["accounting", "ledger", "audit", "balance sheet", "p&l"] },
    CategoryKeywords { name: "Payroll", keywords: &["payroll", "salary", "wage", "slip", "compensation"] },
    CategoryKeywords { name: "Tax", keywords: &["tax", "gst", "itr", "return", "filing"] },
    CategoryKeywords { name: "Investment", keywords: &["investment", "stock", "portfolio", "mutual fund", "equity"] },
];

const EDUCATION_CATEGORIES: &[CategoryKeywords] = &[
    CategoryKeywords { name: "Programming", keywords: &["programming", "python", "java", "code", "development"] },
    CategoryKeywords { name: "Mathematics", keywords: &["math", "algebra", "calculus", "statistics", "geometry"] },
    CategoryKeywords { name: "Science", keywords: &["physics", "chemistry", "biology", "science"] },
    CategoryKeywords { name: "DataScience", keywords: &["data science", "ml", "analysis", "pandas", "numpy"] },
];

const COLLEGE_CATEGORIES: &[CategoryKeywords] = &[
    CategoryKeywords { name: "Admin", keywords: &["transcript", "degree", "certificate", "bonafide", "fee receipt"] },
    CategoryKeywords { name: "Placement", keywords: &["placement", "internship", "job offer", "recruiting", "campus drive"] },
    CategoryKeywords { name: "Academic", keywords: &["course", "syllabus", "project", "assignment", "thesis"] },
    CategoryKeywords { name: "Clubs", keywords: &["club", "event", "fest", "competition", "workshop"] },
];

const SCHOOL_CATEGORIES: &[CategoryKeywords] = &[
    CategoryKeywords { name: "Admin", keywords: &["report card", "result", "leaving certificate", "bonafide", "calendar"] },
    CategoryKeywords { name: "Academic", keywords: &["homework", "worksheet", "assignment", "exam", "quiz"] },
    CategoryKeywords { name: "Events", keywords: &["annual day", "sports day", "field trip", "picnic"] },
];

const COMPANY_CATEGORIES: &[CategoryKeywords] = &[
    CategoryKeywords { name: "Product", keywords: &["prd", "product", "requirements", "roadmap", "user story", "backlog"] },
    CategoryKeywords { name: "Service", keywords: &["sow", "proposal", "agreement", "sla", "deliverable", "contract"] },
    CategoryKeywords { name: "HR", keywords: &["offer letter", "appointment letter", "appraisal", "policy", "handbook"] },
    CategoryKeywords { name: "Legal", keywords: &["nda", "non-disclosure", "contract", "partnership"] },
    CategoryKeywords { name: "Finance", keywords: &["invoice", "quote", "po", "purchase order", "budget"] },
];

const HEALTHCARE_CATEGORIES: &[CategoryKeywords] = &[
    CategoryKeywords { name: "Clinical", keywords: &["prescription", "discharge", "opd", "admission", "case paper"] },
    CategoryKeywords { name: "LabReport", keywords: &["report", "test result", "blood", "urine", "pathology"] },
    CategoryKeywords { name: "Imaging", keywords: &["x-ray", "mri", "abdo", "scan", "usg", "sonography"] },
    CategoryKeywords { name: "Insurance", keywords: &["claim", "insurance", "tpa", "approval", "cashless"] },
];

const PERSONAL_CATEGORIES: &[CategoryKeywords] = &[
    CategoryKeywords { name: "Identity", keywords: &["resume", "cv", "biodata", "id proof", "address proof"] },
    CategoryKeywords { name: "Bills", keywords: &["electricity", "gas", "water", "bill", "maintenance"] },
    CategoryKeywords { name: "Financial", keywords: &["bank statement", "passbook", "credit card", "loan"] },
    CategoryKeywords { name: "Housing", keywords: &["rent agreement", "possession", "allotment", "deed"] },
];

const GOVERNMENT_CATEGORIES: &[CategoryKeywords] = &[
    CategoryKeywords { name: "ID", keywords: &["aadhaar", "pan", "passport", "license", "voter"] },
    CategoryKeywords { name: "Tax", keywords: &["itr", "form 16", "income tax", "acknowledgement"] },
    CategoryKeywords { name: "Legal", keywords: &["affidavit", "agreement", "power of attorney", "deed"] },
];

const LEGAL_CATEGORIES: &[CategoryKeywords] = &[
    CategoryKeywords { name: "Contract", keywords: &["contract", "agreement", "mou", "nda"] },
    CategoryKeywords { name: "Property", keywords: &["lease", "deed", "sale", "rent"] },
    CategoryKeywords { name: "Court", keywords: &["order", "judgment", "petition", "notice"] },
];

const BUSINESS_CATEGORIES: &[CategoryKeywords] = &[
    CategoryKeywords { name: "Strategy", keywords: &["strategy", "plan", "deck", "presentation"] },
    CategoryKeywords { name: "Marketing", keywords: &["campaign", "brochure", "flyer", "social media"] },
    CategoryKeywords { name: "Sales", keywords: &["pipeline", "lead", "proposal", "quote"] },
];

const NO_CATEGORIES: &[CategoryKeywords] = &[];

/// Returns the fourteen built-in domains with their scoring keyword tables.
#[must_use]
pub fn builtin_domains() -> Vec<Domain> {
    vec![
        Domain {
            name: "Technology",
            strong_keywords: &[
                "uav", "drone", "robot", "robotics", "unmanned", "quadcopter", "hexacopter", "flight",
                "web application", "website", "web development", "web design",
                "cloud computing", "cloud infrastructure", "devops", "docker", "kubernetes",
                "aws", "azure", "gcp", "cloud platform", "serverless",
                "database architecture", "data warehouse", "nosql", "mongodb", "postgres", "mysql", "redis", "elasticsearch",
                "api architecture", "rest api", "api design", "api development",
                "infrastructure", "infrastructure as code", "terraform", "ansible",
                "ssl", "tls", "ssl certificate", "tls certificate", "encryption", "authentication protocol", "authorization",
                "cipher", "cryptography", "symmetric", "asymmetric", "decryption", "hashing", "aes", "rsa", "sha",
                "git workflow", "version control system", "ci/cd pipeline", "jenkins", "gitlab ci", "github actions",
                "iot", "iot device", "sensor", "edge computing", "embedded system",
                "network", "networking", "firewall", "proxy", "load balancer",
                "deployment", "containerization", "microservice architecture",
            ],
            weak_keywords: &["tech", "technology", "system", "platform", "solution", "tool", "hardware"],
            categories: TECHNOLOGY_CATEGORIES,
        },
        Domain {
            name: "Code",
            strong_keywords: &[
                "backend development", "backend code", "backend service", "api development",
                "api endpoint", "rest api", "rest architecture", "graphql", "grpc",
                "nodejs", "express", "django", "flask", "fastapi", "spring", "java",
                "react", "vue", "angular", "frontend development", "frontend code",
                "jsx", "tsx", "html", "css", "javascript", "typescript",
                "algorithm", "data structure", "sorting", "searching", "recursion",
                "unit test", "integration test", "testing", "test case",
                "database", "sql", "nosql", "orm", "query", "schema",
                "function", "method", "class", "object", "async", "await",
                "authentication", "authorization", "middleware", "error handling",
                "array", "list", "dictionary", "set", "tuple", "hash",
                "tree", "graph", "binary", "traversal", "bfs", "dfs",
                "refactor", "optimize", "debug", "logging", "cache",
                "time complexity", "space complexity", "big o", "dynamic programming",
                "inheritance", "polymorphism", "encapsulation", "abstraction",
                "decorator", "closure", "lambda", "functional programming",
                "swagger", "openapi", "documentation", "code review", "test driven",
            ],
            weak_keywords: &["code", "programming", "script", "logic", "development", "source"],
            categories: CODE_CATEGORIES,
        },
        Domain {
            name: "Finance",
            strong_keywords: &[
                "revenue", "profit", "loss", "cost", "budget", "budgeting", "forecast", "forecasting",
                "investment", "roi", "return on investment", "financial", "accounting", "bookkeeping",
                "balance sheet", "income statement", "cash flow", "statement of cash flows", "fiscal",
                "audit", "auditor", "auditing", "stock", "equity", "dividend", "dividend yield",
                "payroll", "salary", "wage", "compensation", "benefits", "deduction", "withholding",
                "expense", "expense report", "reimbursement", "invoice", "receipt",
                "tax", "taxation", "tax return", "irs", "filing", "deadline",
                "depreciation", "amortization", "asset", "liability", "net worth",
                "capital", "capital expenditure", "operating expense", "opex", "capex",
                "maintenance", "maintenance cost", "repair", "repair cost", "upkeep",
                "accounting standard", "gaap", "ifrs", "fasb", "sec", "sarbanes oxley",
                "quarterly", "annual", "fiscal year", "reporting period", "financial statement",
            ],
            weak_keywords: &["money", "business", "financial", "payment", "transaction", "account", "ledger"],
            categories: FINANCE_CATEGORIES,
        },
        Domain {
            name: "Education",
            strong_keywords: &[
                "course", "curriculum", "lesson", "module", "unit", "chapter", "section",
                "assignment", "homework", "worksheet", "exercise", "problem", "question",
                "quiz", "exam", "test", "assessment", "evaluation", "grading", "grade",
                "solution", "answer", "explanation", "tutorial", "guide", "handbook",
                "learning objective", "learning outcome", "prerequisite", "syllabus",
                "lecture", "classroom", "seminar", "workshop", "lab", "laboratory",
                "teaching", "instruction", "pedagogy", "didactic", "educational", "academic",
                "student", "learner", "pupil", "scholar", "teacher", "instructor", "professor",
                "school", "university", "college", "academy", "institute", "institution",
                "semester", "quarter", "academic year", "school year", "term",
                "grade level", "elementary", "middle school", "high school", "secondary",
                "python course", "programming course", "math course", "science course",
                "numpy", "pandas", "matplotlib", "seaborn", "plotly", "sklearn", "scikit-learn",
                "tensorflow", "keras", "pytorch", "torch", "deep learning", "machine learning",
                "neural network", "cnn", "rnn", "lstm", "transformer", "model", "training",
                "dataset", "statistics", "statistical", "probability",
                "supervised learning", "unsupervised learning", "reinforcement learning",
                "classification", "regression", "clustering", "dimensionality reduction",
                "feature engineering", "feature selection", "preprocessing", "normalization",
                "validation", "train test split", "cross validation",
                "accuracy", "precision", "recall", "f1 score", "roc", "auc", "confusion matrix",
                "optimization", "gradient descent", "backpropagation", "loss function",
                "hyperparameter", "tuning", "grid search", "random search", "bayesian optimization",
            ],
            weak_keywords: &["educational", "study", "learn", "learning", "knowledge", "skill", "training"],
            categories: EDUCATION_CATEGORIES,
        },
        Domain {
            name: "College",
            strong_keywords: &[
                "university", "college", "campus", "dormitory", "dorm", "residence hall",
                "tuition", "fee", "scholarship", "grant", "financial aid", "loan", "student loan",
                "degree", "bachelor", "master", "phd", "doctorate", "major", "minor", "specialization",
                "gpa", "grade point average", "transcript", "diploma", "convocation",
                "alumni", "alumnus", "alumna", "graduate", "commencement", "graduation",
                "fraternity", "sorority", "greek life", "greek organization", "pledge",
                "club", "organization", "student organization", "student group",
                "student government", "senate", "council", "board", "president",
                "registration", "course registration", "add drop", "course schedule",
                "professor", "instructor", "faculty", "staff", "administrator", "dean",
                "campus life", "student life", "residential life", "internship", "placement", "recruiting",
            ],
            weak_keywords: &["college", "university", "student", "campus", "academic"],
            categories: COLLEGE_CATEGORIES,
        },
        Domain {
            name: "School",
            strong_keywords: &[
                "elementary", "elementary school", "middle school", "high school", "secondary",
                "k-12", "k12", "public school", "private school", "charter school",
                "grade", "grade level", "grade 1", "grade 10", "grade 12",
                "classroom", "class", "period", "lunch period", "recess",
                "teacher", "principal", "staff", "counselor", "nurse", "aide", "administrator",
                "report card", "progress report", "behavior", "discipline", "detention",
                "assignment", "homework", "worksheet", "project", "presentation", "poster",
                "exam", "test", "quiz", "mid-term", "final exam", "board exam",
                "schedule", "timetable", "class schedule", "bell schedule", "calendar",
                "parent", "guardian", "parent teacher conference", "ptc", "pta", "pto",
                "activity", "club", "sports", "athletics", "team", "game", "tournament",
                "field trip", "assembly", "pep rally", "graduation", "commencement",
                "bonafide certificate", "leaving certificate", "transfer certificate", "lc", "tc",
            ],
            weak_keywords: &["school", "education", "student", "learning", "teaching"],
            categories: SCHOOL_CATEGORIES,
        },
        Domain {
            name: "Company",
            strong_keywords: &[
                "employee", "staff", "team", "department", "division", "unit",
                "project", "initiative", "program", "campaign", "strategy",
                "budget", "budgeting", "forecast", "planning", "deadline", "timeline",
                "product", "product line", "product development", "roadmap", "feature",
                "service", "service offering", "service delivery", "consulting",
                "client", "customer", "vendor", "partner", "stakeholder", "supplier",
                "human resources", "hr", "recruitment", "hiring", "onboarding", "offer letter",
                "payroll", "compensation", "salary", "bonus", "incentive", "appraisal",
                "meeting", "standup", "sync", "all hands", "town hall", "minutes of meeting", "mom",
                "presentation", "pitch", "demo", "prototype", "mockup", "wireframe",
                "quarterly", "q1", "q2", "q3", "q4", "fiscal quarter",
                "annual", "annual report", "earnings", "revenue", "profit",
                "performance", "kpi", "key performance indicator", "okr",
                "review", "performance review", "feedback", "evaluation",
                "office", "workspace", "remote", "hybrid", "wfh", "work from home",
                "company culture", "values", "mission", "vision", "policy",
                "business plan", "business model", "sales", "marketing",
                "statement of work", "sow", "sla", "service level agreement",
                "proposal", "contract", "nda", "non-disclosure",
            ],
            weak_keywords: &["company", "work", "business", "job", "employment", "professional"],
            categories: COMPANY_CATEGORIES,
        },
        Domain {
            name: "Healthcare",
            strong_keywords: &[
                "patient", "medical", "medicine", "physician", "doctor", "healthcare",
                "hospital", "clinic", "medical center", "nursing home", "urgent care", "emergency", "icu",
                "diagnosis", "diagnostic", "symptom", "treatment", "therapy", "clinical",
                "prescription", "medication", "pharmaceutical", "drug", "vaccine",
                "disease", "illness", "condition", "disorder", "syndrome",
                "vital signs", "blood pressure", "heart rate", "temperature",
                "surgery", "surgical", "operation", "anesthesia", "recovery",
                "radiology", "x-ray", "ct scan", "mri", "ultrasound", "imaging",
                "laboratory", "lab test", "blood test", "pathology", "biopsy",
                "nursing", "nurse", "registered nurse", "discharge summary", "triage",
                "opd", "outpatient", "inpatient", "admission", "medical history",
                "insurance", "tpa", "claim", "cashless", "mediclaim",
                "dicom", "hl7", "emr", "ehr", "medical record",
            ],
            weak_keywords: &["health", "medicine", "doctor", "medical", "care", "hospital"],
            categories: HEALTHCARE_CATEGORIES,
        },
        Domain {
            name: "Legal",
            strong_keywords: &[
                "contract", "agreement", "lease agreement", "rent agreement",
                "clause", "section", "article", "amendment", "addendum",
                "party", "plaintiff", "defendant", "litigant", "attorney", "lawyer",
                "law", "legal", "statute", "regulation", "act", "bill",
                "copyright", "patent", "trademark", "intellectual property", "ip",
                "liability", "indemnity", "insurance", "coverage",
                "court", "lawsuit", "litigation", "legal action", "trial", "hearing",
                "jurisdiction", "venue", "arbitration", "mediation",
                "herein", "hereby", "whereas", "pursuant to", "in accordance with",
                "effective date", "termination", "breach", "default",
                "damages", "remedy", "injunction", "relief",
                "warrant", "warranty", "represent", "covenant",
                "affidavit", "power of attorney", "poa", "notary", "gazette",
            ],
            weak_keywords: &["legal", "law", "attorney", "rights", "rule"],
            categories: LEGAL_CATEGORIES,
        },
        Domain {
            name: "Business",
            strong_keywords: &[
                "strategy", "strategic plan", "business model", "value proposition",
                "marketing", "marketing strategy", "advertising", "campaign",
                "sales", "sales strategy", "sales pipeline", "funnel",
                "customer", "customer experience", "crm", "customer retention",
                "market", "market share", "market analysis", "competitive analysis",
                "growth", "growth strategy", "expansion", "scaling",
                "operations", "operational", "supply chain", "logistics",
                "management", "leadership", "executive", "ceo", "cfo", "cto",
                "organization", "organizational structure", "restructuring",
                "planning", "objective", "goal", "milestone", "target",
                "innovation", "disruption", "startup", "venture", "fundraising",
            ],
            weak_keywords: &["business", "company", "plan", "goal", "strategy", "market"],
            categories: BUSINESS_CATEGORIES,
        },
        Domain {
            name: "ResearchPaper",
            strong_keywords: &[
                "abstract", "introduction", "methodology", "methods", "results", "discussion", "conclusion", "references",
                "research", "study", "analysis", "experiment", "experimental",
                "hypothesis", "hypothesis test", "statistical significance", "p-value",
                "data analysis", "qualitative", "quantitative",
                "literature review", "related work", "citation", "cite", "bibliography",
                "author", "researcher", "academic", "scholar", "affiliation",
                "journal", "journal article", "peer review", "proceedings",
                "conference", "symposium", "workshop",
                "figure", "table", "graph", "chart", "diagram",
                "et al", "doi", "isbn", "issn", "arxiv",
            ],
            weak_keywords: &["research", "paper", "academic", "study", "analysis", "thesis"],
            categories: NO_CATEGORIES,
        },
        Domain {
            name: "Documentation",
            strong_keywords: &[
                "## ", "# ", "api", "api documentation", "endpoint",
                "parameter", "parameters", "argument", "return value",
                "response", "response code", "response body", "status code",
                "schema", "json schema", "data model",
                "authentication", "authorization", "oauth", "api key", "token",
                "rest", "restful", "http method", "get", "post", "put", "delete",
                "swagger", "openapi", "raml", "api blueprint",
                "example", "usage example", "code snippet", "curl",
                "guide", "getting started", "quick start", "installation", "setup",
                "tutorial", "walkthrough", "step by step", "how to",
            ],
            weak_keywords: &["help", "explain", "guide", "reference", "doc", "manual"],
            categories: NO_CATEGORIES,
        },
        Domain {
            name: "Personal",
            strong_keywords: &[
                "resume", "cv", "curriculum vitae", "biodata", "portfolio",
                "utility bill", "electricity bill", "water bill", "gas bill",
                "credit card statement", "bank statement", "passbook",
                "rent agreement", "lease", "maintenance bill",
                "receipt", "invoice", "warranty card", "guarantee",
                "insurance policy", "premium receipt", "nomination",
                "identity card", "id card", "visiting card",
                "medical report", "prescription", "vaccination certificate",
            ],
            weak_keywords: &["personal", "home", "bill", "statement", "receipt"],
            categories: PERSONAL_CATEGORIES,
        },
        Domain {
            name: "Government",
            strong_keywords: &[
                "aadhaar", "uidai", "pan card", "income tax", "it department",
                "passport", "visa", "immigration",
                "driving license", "dl", "vehicle registration", "rc",
                "voter id", "election card", "epic",
                "ration card", "domicile", "caste certificate",
                "birth certificate", "death certificate", "marriage certificate",
                "form 16", "itr", "income tax return", "acknowledgement",
                "gazette", "notification", "circular", "gr", "government resolution",
                "affidavit", "stamp paper", "notary",
            ],
            weak_keywords: &["government", "govt", "official", "certificate", "id"],
            categories: GOVERNMENT_CATEGORIES,
        },
    ]
}
