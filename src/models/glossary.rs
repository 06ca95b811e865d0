//! Abbreviations reviewers use in dispositions and comments.

/// A glossary entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlossaryEntry {
    /// Abbreviation as written in dispositions.
    pub term: &'static str,
    /// Meaning.
    pub definition: &'static str,
}

const fn entry(term: &'static str, definition: &'static str) -> GlossaryEntry {
    GlossaryEntry { term, definition }
}

/// Every known abbreviation.
pub const ENTRIES: &[GlossaryEntry] = &[
    entry("LCMOD", "Light Curve Modulation"),
    entry("(p)SS", "(Potential) Significant Secondary eclipse"),
    entry("(p)FP", "(Potential) False Positive"),
    entry("CP", "Confirmed Planet"),
    entry("PC", "Planet Candidate"),
    entry("(p)CO", "(Potential) Centroid Offset"),
    entry("(p)Vshape", "(Potential) V-shaped transit"),
    entry("Low SNR", "Low Signal-to-Noise Ratio"),
    entry(
        "(p)TD",
        "(Potentially) Too Deep, i.e. transit depth suggests a stellar companion instead of a planetary companion",
    ),
    entry("ppm", "Parts per Million"),
    entry(
        "FSCP",
        "Field Star in Central Pixel (bright enough to produce transits, i.e. within Delta Tmag)",
    ),
    entry(
        "FSCPdi",
        "Field Star in Central Pixel, ExoFOP direct imaging (bright enough to produce transits, i.e. within Delta Tmag)",
    ),
    entry("SPC", "SIMBAD Planet Candidate"),
    entry("SCP", "SIMBAD Confirmed Planet"),
    entry("OED", "Odd Even differs"),
    entry("TCP", "Tresca Confirmed Planet"),
    entry("EB", "Eclipsing Binary"),
    entry("SB", "Spectroscopic Binary"),
    entry("BEER", "BEaming, Ellipsoidal, Reflection binary star"),
    entry("HPMS", "High Proper Motion Star"),
    entry("Fla", "Flare"),
    entry("NT", "No Transit"),
    entry("TFP", "Too Few Points"),
    entry("SPR", "Shallow: Potentially Rocky PC"),
    entry("MD", "Momentum Dump(s)"),
    entry("Rp", "Radius of Planet"),
    entry("Rs", "Radius of Sun"),
    entry("UC", "Unreliable Centroids"),
    entry("short-P", "Short Period"),
    entry("(p)Occ", "Potential Occultation"),
    entry("run-2min", "Missing 2-min PDF"),
    entry(
        "WE",
        "Wrong ephemerides (transit does not occur at predicted times)",
    ),
    entry("HJ", "Hot Jupiter"),
    entry("MSD", "Misleading data (lightcurve, modshift, centroid)"),
    entry("AT", "Additional transits"),
    entry(
        "FSOP",
        "Field Star in Other Pixel (a star within the Delta Tmag, but outside the central pixel)",
    ),
];

/// Sort key that ignores the "potential" marker.
fn sort_key(term: &str) -> String {
    term.trim_start_matches("(p)").to_string()
}

/// Returns entries whose term contains `query` (case-insensitive), sorted
/// by term with the `(p)` prefix ignored. A blank query returns everything.
#[must_use]
pub fn search(query: &str) -> Vec<&'static GlossaryEntry> {
    let needle = query.trim().to_lowercase();
    let mut matches: Vec<&'static GlossaryEntry> = ENTRIES
        .iter()
        .filter(|e| e.term.to_lowercase().contains(&needle))
        .collect();
    matches.sort_by_key(|e| sort_key(e.term));
    matches
}

/// Looks up an exact term (case-insensitive).
#[must_use]
pub fn lookup(term: &str) -> Option<&'static GlossaryEntry> {
    let term = term.trim();
    ENTRIES.iter().find(|e| e.term.eq_ignore_ascii_case(term))
}
