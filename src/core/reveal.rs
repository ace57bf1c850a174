/// Text reveal — incremental, markup-aware exposure of dialogue text.

/// Outcome of one reveal step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealStep {
    /// One plain character (plus any markup tags before it) became visible.
    Revealed(char),
    /// The cursor reached the end of the text.
    Finished,
}

/// Reveals a string one plain character at a time.
///
/// Markup tags (`<` up to the next `>`) are copied whole with no delay, so
/// the visible text never contains a partial tag. The visible text is
/// always a prefix of the total text. A `<` with no closing `>` is plain.
#[derive(Debug, Clone, Default)]
pub struct TextReveal {
    total: String,
    cursor: usize,
}

impl TextReveal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all text, visible or not.
    pub fn clear(&mut self) {
        self.total.clear();
        self.cursor = 0;
    }

    /// Append `text` to be revealed. Anything already in the buffer becomes
    /// fully visible at once.
    pub fn begin(&mut self, text: &str) {
        self.cursor = self.total.len();
        self.total.push_str(text);
    }

    pub fn visible(&self) -> &str {
        &self.total[..self.cursor]
    }

    pub fn total(&self) -> &str {
        &self.total
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.total.len()
    }

    /// Advance past leading tags and at most one plain character.
    pub fn step(&mut self) -> RevealStep {
        loop {
            let rest = &self.total[self.cursor..];
            let Some(c) = rest.chars().next() else {
                return RevealStep::Finished;
            };
            if c == '<' {
                if let Some(close) = rest.find('>') {
                    self.cursor += close + 1;
                    continue;
                }
            }
            self.cursor += c.len_utf8();
            return RevealStep::Revealed(c);
        }
    }

    /// Jump straight to the end.
    pub fn skip(&mut self) {
        self.cursor = self.total.len();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_to_end(reveal: &mut TextReveal) -> Vec<String> {
        let mut frames = Vec::new();
        while let RevealStep::Revealed(_) = reveal.step() {
            frames.push(reveal.visible().to_string());
        }
        frames
    }

    #[test]
    fn reveals_plain_text_one_char_at_a_time() {
        let mut r = TextReveal::new();
        r.begin("Hey");
        assert_eq!(run_to_end(&mut r), vec!["H", "He", "Hey"]);
        assert!(r.is_finished());
    }

    #[test]
    fn tags_are_copied_whole() {
        let mut r = TextReveal::new();
        r.begin("<b>Hi</b>!");
        assert_eq!(run_to_end(&mut r), vec!["<b>H", "<b>Hi", "<b>Hi</b>!"]);
    }

    #[test]
    fn trailing_tags_appear_on_finish() {
        let mut r = TextReveal::new();
        r.begin("<i>ok</i>");
        assert_eq!(run_to_end(&mut r), vec!["<i>o", "<i>ok"]);
        assert_eq!(r.visible(), "<i>ok</i>");
    }

    #[test]
    fn visible_never_holds_a_partial_tag() {
        let mut r = TextReveal::new();
        r.begin("<color=#FF0000><b>Red</b></color> and <u>under</u>");
        for frame in run_to_end(&mut r) {
            let opens = frame.matches('<').count();
            let closes = frame.matches('>').count();
            assert_eq!(opens, closes, "partial tag in {:?}", frame);
        }
    }

    #[test]
    fn unclosed_angle_bracket_is_plain() {
        let mut r = TextReveal::new();
        r.begin("a<b");
        assert_eq!(run_to_end(&mut r), vec!["a", "a<", "a<b"]);
    }

    #[test]
    fn multibyte_characters() {
        let mut r = TextReveal::new();
        r.begin("né!");
        assert_eq!(run_to_end(&mut r), vec!["n", "né", "né!"]);
    }

    #[test]
    fn skip_matches_full_reveal() {
        let text = "<b>Hello</b>, <i>traveller</i>.";
        let mut full = TextReveal::new();
        full.begin(text);
        run_to_end(&mut full);

        for steps in 0..8 {
            let mut skipped = TextReveal::new();
            skipped.begin(text);
            for _ in 0..steps {
                skipped.step();
            }
            skipped.skip();
            assert_eq!(skipped.visible(), full.visible());
            assert!(skipped.is_finished());
        }
    }

    #[test]
    fn begin_appends_and_shows_previous_text() {
        let mut r = TextReveal::new();
        r.begin("One.");
        r.step();
        r.begin(" Two.");
        assert_eq!(r.visible(), "One.");
        assert_eq!(r.step(), RevealStep::Revealed(' '));
        assert_eq!(r.total(), "One. Two.");
    }

    #[test]
    fn empty_text_finishes_immediately() {
        let mut r = TextReveal::new();
        r.begin("");
        assert_eq!(r.step(), RevealStep::Finished);
        r.clear();
        assert_eq!(r.visible(), "");
    }
}
