#[cfg(test)]
mod tests {
    use nutrition_advisor::quantity_parser::{
        format_as_fraction, parse_quantity_token, scale_lines, split_quantity_from_line,
        MAX_DENOMINATOR,
    };

    #[test]
    fn test_fraction_round_trip_is_error_bounded() {
        let tolerance = 1.0 / (2.0 * f64::from(MAX_DENOMINATOR));

        let mut x = 0.0;
        while x <= 50.0 {
            let rendered = format_as_fraction(x, MAX_DENOMINATOR);
            let parsed = parse_quantity_token(&rendered)
                .unwrap_or_else(|| panic!("'{rendered}' should parse back"));
            assert!(
                (parsed - x).abs() <= tolerance + 1e-12,
                "{x} rendered as {rendered} parsed as {parsed}"
            );
            x += 0.037;
        }
    }

    #[test]
    fn test_scaling_by_one_is_stable() {
        let lines: Vec<String> = [
            "2 cups rice",
            "1 1/2 lb chicken thighs",
            "½ cup yogurt",
            "2-3 cloves garlic",
            "0.333 cup oats",
        ]
        .iter()
        .map(|line| line.to_string())
        .collect();

        let once = scale_lines(&lines, 1.0);
        let twice = scale_lines(&once, 1.0);
        assert_eq!(once, twice);

        for (original, scaled) in lines.iter().zip(&once) {
            let (before, rest_before) = split_quantity_from_line(original);
            let (after, rest_after) = split_quantity_from_line(scaled);
            assert_eq!(rest_before, rest_after);
            let (before, after) = (before.unwrap(), after.unwrap());
            assert!((before - after).abs() <= 1.0 / 32.0, "{original} -> {scaled}");
        }
        assert_eq!(once[1], "3/2 lb chicken thighs");
        assert_eq!(once[3], "5/2 cloves garlic");
    }

    #[test]
    fn test_lines_without_quantity_pass_through() {
        let lines = vec![
            "Salt and pepper".to_string(),
            "a pinch of  nutmeg".to_string(),
            "".to_string(),
        ];
        for factor in [0.25, 1.0, 3.0] {
            assert_eq!(scale_lines(&lines, factor), lines);
        }
    }

    #[test]
    fn test_negative_quantity_is_not_clamped() {
        assert_eq!(split_quantity_from_line("-2 cups water").0, Some(-2.0));
        assert_eq!(scale_lines(&["-2 cups water".to_string()], 0.5), vec!["-1 cups water"]);
    }
}
