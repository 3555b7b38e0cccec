//! Scoring rules

use crate::types::*;

/// Points for one resolved question
pub fn question_points(self_answer: usize, counterpart_answer: usize) -> u32 {
    if self_answer == counterpart_answer {
        MATCH_POINTS
    } else {
        MISMATCH_POINTS
    }
}

/// Best achievable score for a stage
pub fn max_stage_points(stage: &Stage) -> u32 {
    stage.questions.len() as u32 * MATCH_POINTS
}

/// Normalize raw points to a rounded 0-100 percentage
pub fn percent(points: u32, max_points: u32) -> u8 {
    if max_points == 0 {
        return 0;
    }
    let scaled = (u64::from(points) * 100 + u64::from(max_points) / 2) / u64::from(max_points);
    scaled.min(100) as u8
}

pub fn stage_result(stage: &Stage, points: u32) -> StageResult {
    let max_points = max_stage_points(stage);
    StageResult {
        stage_id: stage.id.clone(),
        stage_name: stage.name.clone(),
        points,
        max_points,
        percent: percent(points, max_points),
    }
}

/// Percentage across every committed stage
pub fn overall_percent(results: &[StageResult]) -> u8 {
    let points = results.iter().map(|r| r.points).sum();
    let max_points = results.iter().map(|r| r.max_points).sum();
    percent(points, max_points)
}

impl StageResult {
    /// Share of the best achievable score, for progress bars
    pub fn fraction(&self) -> f32 {
        if self.max_points == 0 {
            0.0
        } else {
            self.points as f32 / self.max_points as f32
        }
    }
}
