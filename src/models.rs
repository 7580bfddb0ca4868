#[derive(Debug, Clone, Copy)]
pub struct Dimension {
    pub key: &'static str,
    pub label: &'static str,
    pub start: usize,
    pub len: usize,
    pub hundred_scale: bool,
}

pub const ITEM_COUNT: usize = 23;

pub const DIMENSIONS: [Dimension; 5] = [
    Dimension {
        key: "TM",
        label: "Teaching Methodology",
        start: 0,
        len: 7,
        hundred_scale: false,
    },
    Dimension {
        key: "TA",
        label: "Teacher's Assessment Procedure",
        start: 7,
        len: 5,
        hundred_scale: false,
    },
    Dimension {
        key: "CM",
        label: "Classroom Management",
        start: 12,
        len: 4,
        hundred_scale: false,
    },
    Dimension {
        key: "IF",
        label: "Integration of Faith",
        start: 16,
        len: 5,
        hundred_scale: false,
    },
    // PTA items are collected on a 1-100 scale and rescaled to 0-5 during
    // aggregation.
    Dimension {
        key: "PTA",
        label: "Teacher's Attendance & Punctuality",
        start: 21,
        len: 2,
        hundred_scale: true,
    },
];

#[derive(Debug, Clone)]
pub struct RawRecord {
    pub course_title: String,
    pub lecturer_name: String,
    pub items: Vec<Option<f64>>,
}

#[derive(Debug, Clone)]
pub struct StandardizedRecord {
    pub course_title: String,
    pub lecturer_name: String,
    pub department: String,
    pub school: String,
    pub items: Vec<Option<f64>>,
}

impl StandardizedRecord {
    pub fn dimension_items(&self, dimension: &Dimension) -> &[Option<f64>] {
        &self.items[dimension.start..dimension.start + dimension.len]
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DimensionScore {
    pub raw: f64,
    pub percent: f64,
}

#[derive(Debug, Clone)]
pub struct AggregatedRow {
    pub course_title: String,
    pub lecturer_name: String,
    pub department: String,
    pub school: String,
    pub dimensions: [DimensionScore; 5],
    pub evaluation: DimensionScore,
    pub respondents: usize,
}

#[derive(Debug, Clone)]
pub struct SchoolBucket {
    pub name: String,
    pub rows: Vec<AggregatedRow>,
}

#[derive(Debug, Clone)]
pub struct CommentRecord {
    pub course_title: String,
    pub lecturer_name: String,
    pub likes: String,
    pub dislikes: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Sentiment::Positive => "Positive",
            Sentiment::Neutral => "Neutral",
            Sentiment::Negative => "Negative",
        };
        write!(f, "{label}")
    }
}

#[derive(Debug, Clone)]
pub struct CommentGroup {
    pub text: String,
    pub count: usize,
    pub polarity: Option<f64>,
    pub sentiment: Option<Sentiment>,
}

/// One row of the externally prepared summary sheet: aggregated scores joined
/// with registration data (class population, response rate).
#[derive(Debug, Clone)]
pub struct SummaryRow {
    pub school: String,
    pub department: String,
    pub course_title: String,
    pub lecturer_name: String,
    pub dimensions: [DimensionScore; 5],
    pub evaluation: DimensionScore,
    pub respondents: u32,
    pub class_population: u32,
    pub response_rate: f64,
}

impl SummaryRow {
    /// More raters than registered students marks the evaluation invalid.
    pub fn is_invalid(&self) -> bool {
        self.respondents > self.class_population
    }
}
