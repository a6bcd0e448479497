use core_types::LetterGrade;

const RETURN_WEIGHT: f64 = 0.4;
const SHARPE_WEIGHT: f64 = 0.3;
const DRAWDOWN_WEIGHT: f64 = 0.3;

/// Lower bounds of each band, best first. Anything below the last is an F.
const BANDS: [(f64, LetterGrade); 7] = [
    (0.8, LetterGrade::APlus),
    (0.7, LetterGrade::A),
    (0.6, LetterGrade::BPlus),
    (0.5, LetterGrade::B),
    (0.4, LetterGrade::CPlus),
    (0.3, LetterGrade::C),
    (0.2, LetterGrade::D),
];

/// `0.4 * total_return + 0.3 * sharpe + 0.3 * (1 - |max_drawdown|)`, all as fractions.
pub fn grade_score(total_return: f64, sharpe: f64, max_drawdown: f64) -> f64 {
    RETURN_WEIGHT * total_return + SHARPE_WEIGHT * sharpe + DRAWDOWN_WEIGHT * (1.0 - max_drawdown.abs())
}

pub fn letter_grade(score: f64) -> LetterGrade {
    BANDS
        .iter()
        .find(|(threshold, _)| score >= *threshold)
        .map(|(_, grade)| *grade)
        .unwrap_or(LetterGrade::F)
}
