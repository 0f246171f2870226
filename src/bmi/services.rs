/// BMI math. Heights come in as centimeters, weights as kilograms.

pub fn compute_bmi(height_cm: f64, weight_kg: f64) -> f64 {
    let height_m = height_cm / 100.0;
    round1(weight_kg / (height_m * height_m))
}

pub fn category_for(bmi: f64) -> &'static str {
    if bmi < 18.5 {
        "Underweight"
    } else if bmi < 25.0 {
        "Normal weight"
    } else if bmi < 30.0 {
        "Overweight"
    } else {
        "Obese"
    }
}

pub fn health_tip_for(category: &str) -> &'static str {
    match category {
        "Underweight" => "Consider a nutrient-rich diet.",
        "Normal weight" => "Great job! Keep maintaining your healthy lifestyle.",
        "Overweight" => "Regular exercise can help improve your health.",
        _ => "Consult a healthcare professional for guidance.",
    }
}

/// Weight range for a "normal" BMI at the given height, e.g. "53.5 - 72.0 kg".
pub fn recommended_range(height_cm: f64) -> String {
    let height_m = height_cm / 100.0;
    let min_w = round1(18.5 * height_m * height_m);
    let max_w = round1(24.9 * height_m * height_m);
    format!("{:.1} - {:.1} kg", min_w, max_w)
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bmi_example_from_docs() {
        // 170cm / 70kg is the canonical example
        let bmi = compute_bmi(170.0, 70.0);
        assert_eq!(bmi, 24.2);
        assert_eq!(category_for(bmi), "Normal weight");
    }

    #[test]
    fn category_boundaries() {
        assert_eq!(category_for(18.4), "Underweight");
        assert_eq!(category_for(18.5), "Normal weight");
        assert_eq!(category_for(24.9), "Normal weight");
        assert_eq!(category_for(25.0), "Overweight");
        assert_eq!(category_for(29.9), "Overweight");
        assert_eq!(category_for(30.0), "Obese");
    }

    #[test]
    fn recommended_range_example() {
        assert_eq!(recommended_range(170.0), "53.5 - 72.0 kg");
    }

    #[test]
    fn bmi_rounds_to_one_decimal() {
        // 80 / (1.83^2) = 23.888... -> 23.9
        assert_eq!(compute_bmi(183.0, 80.0), 23.9);
    }
}
