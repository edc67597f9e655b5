// SPDX-License-Identifier: GPL-3.0-only

//! Fixture translator for integration tests
//!
//! A deliberately small Morse timing implementation. The production
//! translator lives outside this crate; this fixture exists so the pipeline
//! can be exercised end to end with known timing.

use morsecam::{
    DecodeTranslator, EncodeTranslator, LearnedTiming, PlaybackSegment, RatioConfig,
    TranslatorFault,
};

const ALPHABET: &[(char, &str)] = &[
    ('E', "."),
    ('T', "-"),
    ('I', ".."),
    ('S', "..."),
    ('H', "...."),
    ('M', "--"),
    ('O', "---"),
    ('A', ".-"),
    ('N', "-."),
    ('D', "-.."),
    ('U', "..-"),
    ('R', ".-."),
];

fn letter_for(elements: &str) -> Option<char> {
    ALPHABET
        .iter()
        .find(|(_, code)| *code == elements)
        .map(|(ch, _)| *ch)
}

fn code_for(ch: char) -> Option<&'static str> {
    ALPHABET
        .iter()
        .find(|(letter, _)| *letter == ch)
        .map(|(_, code)| *code)
}

/// Fixed-unit Morse translator covering both directions
pub struct MorseFixture {
    unit: f64,
    ratios: RatioConfig,
    // decode state
    current_signal: Option<bool>,
    run: f64,
    elements: String,
    // encode state
    queued: String,
}

impl MorseFixture {
    pub fn new(unit: f64) -> Self {
        Self {
            unit,
            ratios: RatioConfig::default(),
            current_signal: None,
            run: 0.0,
            elements: String::new(),
            queued: String::new(),
        }
    }

    /// Close out the run that just ended and return any finished letters
    fn end_run(&mut self, was_lit: bool) -> Vec<char> {
        let run = self.run;
        if was_lit {
            // Element: anything shorter than two units is a dot
            self.elements
                .push(if run < 2.0 * self.unit { '.' } else { '-' });
            Vec::new()
        } else if run < 2.0 * self.unit {
            // Intra-letter gap
            Vec::new()
        } else {
            let mut out = Vec::new();
            if let Some(ch) = letter_for(&self.elements) {
                out.push(ch);
            }
            self.elements.clear();
            if run >= 5.0 * self.unit {
                out.push(' ');
            }
            out
        }
    }
}

impl DecodeTranslator for MorseFixture {
    fn feed(&mut self, signal: bool, duration: f64) -> Result<Vec<char>, TranslatorFault> {
        match self.current_signal {
            Some(current) if current == signal => {
                self.run += duration;
                Ok(Vec::new())
            }
            Some(current) => {
                let letters = self.end_run(current);
                self.current_signal = Some(signal);
                self.run = duration;
                Ok(letters)
            }
            None => {
                self.current_signal = Some(signal);
                self.run = duration;
                Ok(Vec::new())
            }
        }
    }

    fn finalize(&mut self) -> Result<Vec<char>, TranslatorFault> {
        let mut out = Vec::new();
        if let Some(current) = self.current_signal.take() {
            out.extend(self.end_run(current));
        }
        if let Some(ch) = letter_for(&self.elements) {
            out.push(ch);
        }
        self.elements.clear();
        Ok(out)
    }

    fn learned_timing(&self) -> LearnedTiming {
        LearnedTiming {
            unit: Some(self.unit),
            ratios: Some(self.ratios),
        }
    }
}

impl EncodeTranslator for MorseFixture {
    fn set_timing(&mut self, timing: &LearnedTiming) {
        if let Some(unit) = timing.unit {
            self.unit = unit;
        }
        if let Some(ratios) = timing.ratios {
            self.ratios = ratios;
        }
    }

    fn enqueue(&mut self, ch: char) {
        self.queued.push(ch);
    }

    fn flush(&mut self) -> Vec<PlaybackSegment> {
        let text = std::mem::take(&mut self.queued);
        let mut plan: Vec<PlaybackSegment> = Vec::new();

        for ch in text.chars() {
            if ch == ' ' {
                // Stretch the preceding letter gap into a word gap
                if let Some(last) = plan.last_mut() {
                    if !last.signal {
                        last.duration = self.ratios.word_gap * self.unit;
                    }
                }
                continue;
            }
            let Some(code) = code_for(ch) else { continue };
            for (i, element) in code.chars().enumerate() {
                if i > 0 {
                    plan.push(PlaybackSegment {
                        signal: false,
                        duration: self.ratios.intra_gap * self.unit,
                    });
                }
                let units = if element == '.' {
                    self.ratios.dot
                } else {
                    self.ratios.dash
                };
                plan.push(PlaybackSegment {
                    signal: true,
                    duration: units * self.unit,
                });
            }
            plan.push(PlaybackSegment {
                signal: false,
                duration: self.ratios.letter_gap * self.unit,
            });
        }

        plan
    }
}
