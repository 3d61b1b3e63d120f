//! Caption text: artist list, statistic formatting, and greedy line wrapping.

// std
use std::mem;
// self
use crate::catalog::EntityMetadata;

/// Builds the card caption for `metadata` and the raw `statistic`.
pub fn compose_caption(metadata: &EntityMetadata, statistic: &str) -> String {
	format!(
		"{} just passed {} streams on their song, \"{}\".",
		format_artists(&metadata.artist_names()),
		format_statistic(statistic),
		metadata.name
	)
}

/// Joins artist names: `A`, `A and B`, `A, B, and C`.
pub fn format_artists(names: &[&str]) -> String {
	match names {
		[] => String::new(),
		[only] => (*only).to_owned(),
		[first, second] => format!("{first} and {second}"),
		[head @ .., last] => format!("{}, and {last}", head.join(", ")),
	}
}

/// Abbreviates large counts (`15k`, `1.5 million`, `2 billion`).
///
/// Values below ten thousand, and anything that is not a number, are returned unchanged.
pub fn format_statistic(raw: &str) -> String {
	let digits = raw.trim().replace([',', '_'], "");
	let Ok(value) = digits.parse::<f64>() else {
		return raw.to_owned();
	};

	if !value.is_finite() {
		return raw.to_owned();
	}
	if value >= 1e9 {
		return format!("{} billion", trim_fraction(format!("{:.2}", value / 1e9)));
	}
	if value >= 1e6 {
		return format!("{} million", trim_fraction(format!("{:.2}", value / 1e6)));
	}
	if value >= 1e4 {
		return format!("{}k", trim_fraction(format!("{:.1}", value / 1e3)));
	}

	raw.to_owned()
}

/// Greedily wraps `text` word by word so no line is wider than `max_width`.
///
/// A single word wider than `max_width` keeps a line of its own.
pub fn wrap_lines<M>(text: &str, max_width: f32, measure: M) -> Vec<String>
where
	M: Fn(&str) -> f32,
{
	let mut lines = Vec::new();
	let mut current = String::new();

	for word in text.split_whitespace() {
		if current.is_empty() {
			current.push_str(word);

			continue;
		}

		let candidate = format!("{current} {word}");

		if measure(&candidate) > max_width {
			lines.push(mem::replace(&mut current, word.to_owned()));
		} else {
			current = candidate;
		}
	}
	if !current.is_empty() {
		lines.push(current);
	}

	lines
}

fn trim_fraction(fixed: String) -> String {
	if fixed.contains('.') {
		fixed.trim_end_matches('0').trim_end_matches('.').to_owned()
	} else {
		fixed
	}
}
