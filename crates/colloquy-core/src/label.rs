use crate::graph::SpeakerNode;

/// Human-readable node label: `character_name` with every word capitalized, or the id.
pub fn display_label(node: &SpeakerNode) -> String {
    match node.meta.get("character_name").and_then(|v| v.as_str()) {
        Some(name) if !name.trim().is_empty() => capitalize_words(name),
        _ => node.id.clone(),
    }
}

fn capitalize_words(s: &str) -> String {
    s.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.as_str().to_lowercase().chars())
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
