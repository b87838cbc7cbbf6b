use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ActionId {
    RefreshAgent,
    GenerateIdeal,
    GenerateErrors,
    GetOriginalSql,
    ErrorsAnalysis,
    MissingValues,
    ModifyInteractive,
    ModifyBatch,
    ReduceFiles,
    AskCsvQuestion,
}

pub const ALL_ACTIONS: [ActionId; 10] = [
    ActionId::RefreshAgent,
    ActionId::GenerateIdeal,
    ActionId::GenerateErrors,
    ActionId::GetOriginalSql,
    ActionId::ErrorsAnalysis,
    ActionId::MissingValues,
    ActionId::ModifyInteractive,
    ActionId::ModifyBatch,
    ActionId::ReduceFiles,
    ActionId::AskCsvQuestion,
];

/// Offered by the first-round menu.
pub const ACTION_MENU_ACTIONS: [ActionId; 3] = [
    ActionId::RefreshAgent,
    ActionId::GenerateIdeal,
    ActionId::GenerateErrors,
];

/// Offered by the follow-up menu: every action, data inspection first.
pub const FOLLOW_UP_MENU_ACTIONS: [ActionId; 10] = [
    ActionId::RefreshAgent,
    ActionId::GetOriginalSql,
    ActionId::ErrorsAnalysis,
    ActionId::MissingValues,
    ActionId::ModifyInteractive,
    ActionId::ModifyBatch,
    ActionId::ReduceFiles,
    ActionId::AskCsvQuestion,
    ActionId::GenerateIdeal,
    ActionId::GenerateErrors,
];

impl ActionId {
    pub fn as_str(self) -> &'static str {
        match self {
            ActionId::RefreshAgent => "refresh-agent",
            ActionId::GenerateIdeal => "generate-ideal",
            ActionId::GenerateErrors => "generate-errors",
            ActionId::GetOriginalSql => "get-original-sql",
            ActionId::ErrorsAnalysis => "errors-analysis",
            ActionId::MissingValues => "missing-values",
            ActionId::ModifyInteractive => "modify-interactive",
            ActionId::ModifyBatch => "modify-batch",
            ActionId::ReduceFiles => "reduce-files",
            ActionId::AskCsvQuestion => "ask-csv-question",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, String> {
        let normalized = raw.trim().to_ascii_lowercase();
        ALL_ACTIONS
            .iter()
            .copied()
            .find(|id| id.as_str() == normalized)
            .ok_or_else(|| {
                let valid = ALL_ACTIONS
                    .iter()
                    .map(|id| id.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("unknown action `{}`; valid actions: {valid}", raw.trim())
            })
    }

    pub fn descriptor(self) -> &'static ActionDescriptor {
        match self {
            ActionId::RefreshAgent => &REFRESH_AGENT,
            ActionId::GenerateIdeal => &GENERATE_IDEAL,
            ActionId::GenerateErrors => &GENERATE_ERRORS,
            ActionId::GetOriginalSql => &GET_ORIGINAL_SQL,
            ActionId::ErrorsAnalysis => &ERRORS_ANALYSIS,
            ActionId::MissingValues => &MISSING_VALUES,
            ActionId::ModifyInteractive => &MODIFY_INTERACTIVE,
            ActionId::ModifyBatch => &MODIFY_BATCH,
            ActionId::ReduceFiles => &REDUCE_FILES,
            ActionId::AskCsvQuestion => &ASK_CSV_QUESTION,
        }
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed per action; never inferred from response headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    Json,
    Text,
}

impl ResponseKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ResponseKind::Json => "json",
            ResponseKind::Text => "text",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number { min: i64 },
    File { extensions: &'static [&'static str] },
}

impl FieldKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Number { .. } => "number",
            FieldKind::File { .. } => "file",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionDescriptor {
    pub id: ActionId,
    pub label: &'static str,
    pub endpoint: &'static str,
    pub method: HttpMethod,
    pub field_spec: &'static [FieldSpec],
    pub response_kind: ResponseKind,
}

impl ActionDescriptor {
    pub fn requires_form(&self) -> bool {
        !self.field_spec.is_empty()
    }

    pub fn field(&self, name: &str) -> Option<&'static FieldSpec> {
        self.field_spec.iter().find(|spec| spec.name == name)
    }
}

pub const INSTRUCTION_FILE_EXTENSIONS: &[&str] = &["txt", "csv", "sql"];

const INDUSTRY_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: "industry",
        label: "Industry",
        kind: FieldKind::Text,
    },
    FieldSpec {
        name: "subdomain",
        label: "Subdomain",
        kind: FieldKind::Text,
    },
];

const MODIFY_INTERACTIVE_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: "filename",
        label: "Filename",
        kind: FieldKind::Text,
    },
    FieldSpec {
        name: "instruction",
        label: "Instruction",
        kind: FieldKind::Text,
    },
];

const MODIFY_BATCH_FIELDS: &[FieldSpec] = &[FieldSpec {
    name: "instruction_file",
    label: "Instruction File",
    kind: FieldKind::File {
        extensions: INSTRUCTION_FILE_EXTENSIONS,
    },
}];

const REDUCE_FILES_FIELDS: &[FieldSpec] = &[FieldSpec {
    name: "n_keep",
    label: "Number of files to keep",
    kind: FieldKind::Number { min: 1 },
}];

const ASK_CSV_QUESTION_FIELDS: &[FieldSpec] = &[FieldSpec {
    name: "question",
    label: "Question",
    kind: FieldKind::Text,
}];

static REFRESH_AGENT: ActionDescriptor = ActionDescriptor {
    id: ActionId::RefreshAgent,
    label: "Refresh Agent",
    endpoint: "/refresh-agent/",
    method: HttpMethod::Post,
    field_spec: &[],
    response_kind: ResponseKind::Json,
};

static GENERATE_IDEAL: ActionDescriptor = ActionDescriptor {
    id: ActionId::GenerateIdeal,
    label: "Generate Ideal Data",
    endpoint: "/generate-ideal-data/",
    method: HttpMethod::Post,
    field_spec: INDUSTRY_FIELDS,
    response_kind: ResponseKind::Json,
};

static GENERATE_ERRORS: ActionDescriptor = ActionDescriptor {
    id: ActionId::GenerateErrors,
    label: "Generate Data With Errors",
    endpoint: "/generate-data-with-realistic-errors/",
    method: HttpMethod::Post,
    field_spec: INDUSTRY_FIELDS,
    response_kind: ResponseKind::Json,
};

static GET_ORIGINAL_SQL: ActionDescriptor = ActionDescriptor {
    id: ActionId::GetOriginalSql,
    label: "Get Original SQL Contents",
    endpoint: "/get-original-sql-contents/",
    method: HttpMethod::Get,
    field_spec: &[],
    response_kind: ResponseKind::Text,
};

static ERRORS_ANALYSIS: ActionDescriptor = ActionDescriptor {
    id: ActionId::ErrorsAnalysis,
    label: "Errors Analysis",
    endpoint: "/errors-analysis/",
    method: HttpMethod::Get,
    field_spec: &[],
    response_kind: ResponseKind::Json,
};

static MISSING_VALUES: ActionDescriptor = ActionDescriptor {
    id: ActionId::MissingValues,
    label: "Missing Values",
    endpoint: "/missing-values/",
    method: HttpMethod::Get,
    field_spec: &[],
    response_kind: ResponseKind::Json,
};

static MODIFY_INTERACTIVE: ActionDescriptor = ActionDescriptor {
    id: ActionId::ModifyInteractive,
    label: "Modify Data Interactive",
    endpoint: "/modify-data-interactive/",
    method: HttpMethod::Post,
    field_spec: MODIFY_INTERACTIVE_FIELDS,
    response_kind: ResponseKind::Json,
};

static MODIFY_BATCH: ActionDescriptor = ActionDescriptor {
    id: ActionId::ModifyBatch,
    label: "Modify Data Batch",
    endpoint: "/modify-data-batch/",
    method: HttpMethod::Post,
    field_spec: MODIFY_BATCH_FIELDS,
    response_kind: ResponseKind::Json,
};

static REDUCE_FILES: ActionDescriptor = ActionDescriptor {
    id: ActionId::ReduceFiles,
    label: "Reduce Files",
    endpoint: "/reduce-files/",
    method: HttpMethod::Post,
    field_spec: REDUCE_FILES_FIELDS,
    response_kind: ResponseKind::Json,
};

static ASK_CSV_QUESTION: ActionDescriptor = ActionDescriptor {
    id: ActionId::AskCsvQuestion,
    label: "Ask CSV Question",
    endpoint: "/ask-csv-question/",
    method: HttpMethod::Post,
    field_spec: ASK_CSV_QUESTION_FIELDS,
    response_kind: ResponseKind::Json,
};

/// The single connectivity probe target.
pub const PROBE_ACTION: ActionId = ActionId::ErrorsAnalysis;
