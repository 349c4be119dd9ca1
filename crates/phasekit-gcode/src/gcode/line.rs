//! G-code line classification
//!
//! Every input line is classified once into a [`GcodeLine`]. Motion and
//! temperature lines are split into a command, its words and an optional
//! trailing comment so the transforms can rewrite individual words.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Comment markers written by the slicer that drive the editor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Marker {
    /// `; layer_height=<v>`
    LayerHeight(f64),
    /// `;LAYER_CHANGE`
    LayerChange,
    /// `;BEFORE_LAYER_CHANGE`
    BeforeLayerChange,
    /// `;TYPE:External perimeter`
    ExternalPerimeter,
    /// `;WIPE_START`
    WipeStart,
    /// Any other comment
    Plain,
}

impl Marker {
    fn from_comment(line: &str) -> Self {
        static LAYER_HEIGHT: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
        let layer_height = LAYER_HEIGHT.get_or_init(|| {
            Regex::new(r"^;\s*layer_height\s*=\s*([-+]?[0-9]*\.?[0-9]+(?:[eE][-+]?[0-9]+)?)")
                .expect("invalid regex pattern")
        });

        if line == ";LAYER_CHANGE" {
            Self::LayerChange
        } else if line == ";BEFORE_LAYER_CHANGE" {
            Self::BeforeLayerChange
        } else if line.starts_with(";TYPE:External perimeter") {
            Self::ExternalPerimeter
        } else if line.starts_with(";WIPE_START") {
            Self::WipeStart
        } else if let Some(value) = layer_height
            .captures(line)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<f64>().ok())
        {
            Self::LayerHeight(value)
        } else {
            Self::Plain
        }
    }
}

/// One word of a command line, e.g. `X10.5` or `F1200`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    /// Address letter, uppercase
    pub letter: char,
    /// Text after the letter, kept verbatim until the word is rewritten
    pub raw: String,
}

impl Word {
    fn parse(token: &str) -> Self {
        let mut chars = token.chars();
        let letter = chars.next().map(|c| c.to_ascii_uppercase()).unwrap_or(' ');
        Self {
            letter,
            raw: chars.as_str().to_string(),
        }
    }

    /// Create a word with a value formatted to 3 decimals
    pub fn number(letter: char, value: f64) -> Self {
        Self {
            letter,
            raw: format!("{value:.3}"),
        }
    }

    /// Numeric value of the word, if it has one
    pub fn value(&self) -> Option<f64> {
        self.raw.parse::<f64>().ok().filter(|v| v.is_finite())
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.letter, self.raw)
    }
}

/// Marker appended to every rewritten line
pub const MODIFIED_MARKER: &str = ";Modified";

/// A command line split into command, words and trailing comment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandLine {
    /// Command as written, e.g. `G1`
    pub command: String,
    pub words: Vec<Word>,
    /// Trailing comment including its `;`
    pub comment: Option<String>,
    /// Set once any transform rewrote a word
    pub modified: bool,
}

impl CommandLine {
    /// Split a line into command, words and comment
    ///
    /// Returns `None` for lines without a command.
    pub fn parse(line: &str) -> Option<Self> {
        let (code, comment) = match line.find(';') {
            Some(pos) => (&line[..pos], Some(line[pos..].trim_end().to_string())),
            None => (line, None),
        };
        let mut tokens = code.split_whitespace();
        let command = tokens.next()?.to_string();
        Some(Self {
            command,
            words: tokens.map(Word::parse).collect(),
            comment,
            modified: false,
        })
    }

    /// First word with the given letter
    pub fn word(&self, letter: char) -> Option<&Word> {
        self.words.iter().find(|w| w.letter == letter)
    }

    /// Numeric value of the first word with the given letter
    pub fn value(&self, letter: char) -> Option<f64> {
        self.word(letter).and_then(Word::value)
    }

    /// XY position of the line when both X and Y are present
    pub fn xy(&self) -> Option<(f64, f64)> {
        Some((self.value('X')?, self.value('Y')?))
    }

    /// Rewrite every numeric word with the given letter
    ///
    /// Words whose text is not a number are left alone. The line is marked
    /// modified when at least one word was rewritten.
    pub fn map_words(mut self, letter: char, f: impl Fn(f64) -> f64) -> Self {
        for word in self.words.iter_mut().filter(|w| w.letter == letter) {
            if let Some(value) = word.value() {
                *word = Word::number(letter, f(value));
                self.modified = true;
            }
        }
        self
    }

    /// Serialize the line with the modified marker
    pub fn render(&self) -> String {
        let mut out = self.command.clone();
        for word in &self.words {
            out.push(' ');
            out.push_str(&word.to_string());
        }
        if let Some(comment) = &self.comment {
            out.push(' ');
            out.push_str(comment);
        }
        out.push(' ');
        out.push_str(MODIFIED_MARKER);
        out
    }
}

/// Temperature command kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemperatureKind {
    /// `M104`: set nozzle temperature
    SetNozzle,
    /// `M109`: set nozzle temperature and wait
    WaitNozzle,
}

impl TemperatureKind {
    /// Word carrying the target temperature
    pub fn value_letter(&self) -> char {
        match self {
            Self::SetNozzle => 'S',
            Self::WaitNozzle => 'R',
        }
    }

    /// Command code
    pub fn code(&self) -> &'static str {
        match self {
            Self::SetNozzle => "M104",
            Self::WaitNozzle => "M109",
        }
    }
}

/// A temperature command line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperatureCommand {
    pub kind: TemperatureKind,
    pub line: CommandLine,
}

/// Classified G-code line
#[derive(Debug, Clone, PartialEq)]
pub enum GcodeLine {
    /// Line starting with `;`
    Comment(Marker),
    /// `G0`/`G1` move
    Motion(CommandLine),
    /// `M104`/`M109`
    TemperatureCommand(TemperatureCommand),
    /// Anything else, passed through untouched
    Other,
}

/// Classify one line (without its line terminator)
pub fn classify(line: &str) -> GcodeLine {
    let trimmed = line.trim();
    if trimmed.starts_with(';') {
        return GcodeLine::Comment(Marker::from_comment(trimmed));
    }

    let Some(command) = CommandLine::parse(trimmed) else {
        return GcodeLine::Other;
    };
    match command.command.to_ascii_uppercase().as_str() {
        "G0" | "G00" | "G1" | "G01" => GcodeLine::Motion(command),
        "M104" => GcodeLine::TemperatureCommand(TemperatureCommand {
            kind: TemperatureKind::SetNozzle,
            line: command,
        }),
        "M109" => GcodeLine::TemperatureCommand(TemperatureCommand {
            kind: TemperatureKind::WaitNozzle,
            line: command,
        }),
        _ => GcodeLine::Other,
    }
}
