use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grade {
    pub id: Uuid,
    pub student_id: Uuid,
    pub subject_id: Uuid,
    pub quarter_grade: Option<i32>,
    pub yearly_grade: Option<i32>,
    pub average_score: f64,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Serialize)]
pub struct GradeEntry {
    #[serde(flatten)]
    pub grade: Grade,
    pub subject_name: String,
}

/// Marks are on the five-point scale.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RecordGradeRequest {
    pub student_id: Uuid,
    pub subject_id: Uuid,
    #[validate(range(min = 1, max = 5))]
    pub quarter_grade: Option<i32>,
    #[validate(range(min = 1, max = 5))]
    pub yearly_grade: Option<i32>,
    #[validate(range(min = 0.0, max = 5.0))]
    #[serde(default)]
    pub average_score: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_range() {
        let request = RecordGradeRequest {
            student_id: Uuid::new_v4(),
            subject_id: Uuid::new_v4(),
            quarter_grade: Some(6),
            yearly_grade: None,
            average_score: 4.5,
        };
        assert!(request.validate().is_err());

        let request = RecordGradeRequest {
            quarter_grade: Some(5),
            ..request
        };
        assert!(request.validate().is_ok());
    }
}
