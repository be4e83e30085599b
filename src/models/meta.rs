// src/models/meta.rs

use chrono::Datelike;
use serde::Serialize;

use crate::config::EARLIEST_EXAM_YEAR;

/// A selectable option on the lookup form: upstream code plus display label.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FormOption {
    pub code: &'static str,
    pub label: &'static str,
}

/// Education boards as the upstream provider names them.
pub const BOARDS: &[FormOption] = &[
    FormOption { code: "barisal", label: "Barisal" },
    FormOption { code: "chittagong", label: "Chittagong" },
    FormOption { code: "comilla", label: "Comilla" },
    FormOption { code: "dhaka", label: "Dhaka" },
    FormOption { code: "dinajpur", label: "Dinajpur" },
    FormOption { code: "jessore", label: "Jessore" },
    FormOption { code: "mymensingh", label: "Mymensingh" },
    FormOption { code: "rajshahi", label: "Rajshahi" },
    FormOption { code: "sylhet", label: "Sylhet" },
    FormOption { code: "madrasah", label: "Madrasah" },
    FormOption { code: "tec", label: "Technical" },
];

pub const EXAMS: &[FormOption] = &[
    FormOption { code: "jsc", label: "JSC/JDC" },
    FormOption { code: "ssc", label: "SSC/Dakhil/Equivalent" },
    FormOption { code: "dakhil", label: "Dakhil" },
    FormOption { code: "ssc_voc", label: "SSC (Vocational)" },
    FormOption { code: "hsc", label: "HSC/Alim" },
    FormOption { code: "alim", label: "Alim" },
    FormOption { code: "hsc_voc", label: "HSC (Vocational)" },
    FormOption { code: "hsc_bm", label: "HSC (BM)" },
    FormOption { code: "dibs", label: "Diploma in Business Studies" },
];

pub fn is_known_board(code: &str) -> bool {
    BOARDS.iter().any(|b| b.code == code)
}

pub fn is_known_exam(code: &str) -> bool {
    EXAMS.iter().any(|e| e.code == code)
}

pub fn current_year() -> i32 {
    chrono::Local::now().year()
}

/// Response of `GET /api/meta`.
#[derive(Debug, Serialize)]
pub struct FormMeta {
    pub boards: &'static [FormOption],
    pub exams: &'static [FormOption],
    pub earliest_year: i32,
    pub latest_year: i32,
}

impl FormMeta {
    pub fn current() -> Self {
        Self {
            boards: BOARDS,
            exams: EXAMS,
            earliest_year: EARLIEST_EXAM_YEAR,
            latest_year: current_year(),
        }
    }
}
