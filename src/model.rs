use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ParseError, PourError};
use crate::rng::SeededRng;

pub const BOTTLE_CAPACITY: usize = 4;
pub const PALETTE_SIZE: usize = 7;

#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    Red,
    Blue,
    Yellow,
    Purple,
    Green,
    Orange,
    Pink,
}

impl Color {
    pub const ALL: [Color; PALETTE_SIZE] = [
        Color::Red,
        Color::Blue,
        Color::Yellow,
        Color::Purple,
        Color::Green,
        Color::Orange,
        Color::Pink,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            Color::Red => "red",
            Color::Blue => "blue",
            Color::Yellow => "yellow",
            Color::Purple => "purple",
            Color::Green => "green",
            Color::Orange => "orange",
            Color::Pink => "pink",
        }
    }

    /// Display value handed to renderers.
    pub fn hex(self) -> &'static str {
        match self {
            Color::Red => "#E63946",
            Color::Blue => "#00B4D8",
            Color::Yellow => "#FFCE03",
            Color::Purple => "#9B5DE5",
            Color::Green => "#06D6A0",
            Color::Orange => "#FF6B35",
            Color::Pink => "#FF69B4",
        }
    }

    /// Palette position as a letter: A is the first color.
    pub fn letter(self) -> char {
        (b'A' + self.index() as u8) as char
    }

    pub fn from_letter(ch: char) -> Option<Self> {
        if !ch.is_ascii_alphabetic() {
            return None;
        }
        let up = ch.to_ascii_uppercase();
        Self::from_index((up as u8 - b'A') as usize)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One slot of a bottle. Serialized as the color name, or `null` when empty.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default, Serialize, Deserialize)]
#[serde(from = "Option<Color>", into = "Option<Color>")]
pub enum Layer {
    #[default]
    Empty,
    Liquid(Color),
}

impl Layer {
    pub fn is_empty(&self) -> bool {
        matches!(self, Layer::Empty)
    }

    pub fn color(&self) -> Option<Color> {
        match self {
            Layer::Liquid(color) => Some(*color),
            Layer::Empty => None,
        }
    }

    pub fn letter(&self) -> char {
        self.color().map_or('.', Color::letter)
    }

    pub fn from_letter(ch: char) -> Result<Self, ParseError> {
        if ch == '.' || ch == '_' {
            return Ok(Layer::Empty);
        }
        Color::from_letter(ch)
            .map(Layer::Liquid)
            .ok_or(ParseError::InvalidSymbol(ch))
    }
}

impl From<Option<Color>> for Layer {
    fn from(value: Option<Color>) -> Self {
        value.map_or(Layer::Empty, Layer::Liquid)
    }
}

impl From<Layer> for Option<Color> {
    fn from(value: Layer) -> Self {
        value.color()
    }
}

/// The contiguous same-color run at the top of a bottle.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct TopInfo {
    pub color: Color,
    pub count: usize,
    pub top_index: usize,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bottle {
    id: usize,
    layers: [Layer; BOTTLE_CAPACITY],
}

impl Bottle {
    pub fn new(id: usize, layers: [Layer; BOTTLE_CAPACITY]) -> Self {
        Self { id, layers }
    }

    pub fn empty(id: usize) -> Self {
        Self::new(id, [Layer::Empty; BOTTLE_CAPACITY])
    }

    pub fn filled(id: usize, color: Color) -> Self {
        Self::new(id, [Layer::Liquid(color); BOTTLE_CAPACITY])
    }

    pub fn from_repr(id: usize, repr: &str) -> Result<Self, ParseError> {
        let symbols: Vec<char> = repr.trim().chars().collect();
        if symbols.len() != BOTTLE_CAPACITY {
            return Err(ParseError::WrongLength {
                index: id,
                len: symbols.len(),
                expected: BOTTLE_CAPACITY,
            });
        }
        let mut layers = [Layer::Empty; BOTTLE_CAPACITY];
        for (slot, ch) in layers.iter_mut().zip(symbols) {
            *slot = Layer::from_letter(ch)?;
        }
        Ok(Self::new(id, layers))
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn layers(&self) -> &[Layer; BOTTLE_CAPACITY] {
        &self.layers
    }

    pub fn top_info(&self) -> Option<TopInfo> {
        let top_index = self.layers.iter().rposition(|l| !l.is_empty())?;
        let color = self.layers[top_index].color()?;
        let count = self.layers[..=top_index]
            .iter()
            .rev()
            .take_while(|l| l.color() == Some(color))
            .count();
        Some(TopInfo {
            color,
            count,
            top_index,
        })
    }

    pub fn top_color(&self) -> Option<Color> {
        self.top_info().map(|top| top.color)
    }

    pub fn empty_count(&self) -> usize {
        self.layers.iter().filter(|l| l.is_empty()).count()
    }

    pub fn filled_count(&self) -> usize {
        BOTTLE_CAPACITY - self.empty_count()
    }

    pub fn is_empty(&self) -> bool {
        self.empty_count() == BOTTLE_CAPACITY
    }

    pub fn is_full(&self) -> bool {
        self.empty_count() == 0
    }

    /// Every non-empty layer has the same color. False for an empty bottle.
    pub fn is_uniform(&self) -> bool {
        let mut colors = self.layers.iter().filter_map(Layer::color);
        match colors.next() {
            Some(first) => colors.all(|c| c == first),
            None => false,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.is_full() && self.is_uniform()
    }

    fn remove_top(&mut self, amount: usize) {
        let mut removed = 0;
        for layer in self.layers.iter_mut().rev() {
            if removed == amount {
                break;
            }
            if !layer.is_empty() {
                *layer = Layer::Empty;
                removed += 1;
            }
        }
    }

    fn fill(&mut self, color: Color, amount: usize) {
        let mut added = 0;
        for layer in self.layers.iter_mut() {
            if added == amount {
                break;
            }
            if layer.is_empty() {
                *layer = Layer::Liquid(color);
                added += 1;
            }
        }
    }

    pub fn text_representation(&self) -> String {
        self.layers.iter().map(Layer::letter).collect()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct MoveAction {
    pub from: usize,
    pub to: usize,
    pub color: Color,
    pub amount: usize,
}

/// Order-independent identity of a puzzle position, used to deduplicate
/// search states.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateKey(Vec<[Layer; BOTTLE_CAPACITY]>);

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Puzzle {
    bottles: Vec<Bottle>,
}

impl Puzzle {
    pub fn new(bottles: Vec<Bottle>) -> Self {
        Self { bottles }
    }

    /// One complete bottle per color followed by empty bottles.
    pub fn solved(colors: &[Color], bottle_count: usize) -> Self {
        let mut bottles: Vec<Bottle> = colors
            .iter()
            .enumerate()
            .map(|(id, color)| Bottle::filled(id, *color))
            .collect();
        for id in colors.len()..bottle_count {
            bottles.push(Bottle::empty(id));
        }
        Self::new(bottles)
    }

    /// Parses the space-separated form produced by [`Puzzle::text_representation`],
    /// e.g. `"ABAB BABA ...."`. Bottle ids follow token order.
    pub fn from_repr(repr: &str) -> Result<Self, ParseError> {
        let bottles = repr
            .split_whitespace()
            .enumerate()
            .map(|(id, token)| Bottle::from_repr(id, token))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(bottles))
    }

    pub fn bottles(&self) -> &[Bottle] {
        &self.bottles
    }

    pub fn len(&self) -> usize {
        self.bottles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bottles.is_empty()
    }

    pub fn index_of(&self, id: usize) -> Option<usize> {
        self.bottles.iter().position(|b| b.id == id)
    }

    pub fn is_solved(&self) -> bool {
        self.bottles.iter().all(|b| b.is_empty() || b.is_complete())
    }

    /// Checks the pour rules in order and returns the number of layers that
    /// would move.
    pub fn check_pour(&self, from: usize, to: usize) -> Result<usize, PourError> {
        self.plan_pour(from, to).map(|action| action.amount)
    }

    fn plan_pour(&self, from: usize, to: usize) -> Result<MoveAction, PourError> {
        let (Some(source), Some(target)) = (self.bottles.get(from), self.bottles.get(to)) else {
            return Err(PourError::UnknownBottle);
        };
        if from == to {
            return Err(PourError::SameBottle);
        }
        let Some(top) = source.top_info() else {
            return Err(PourError::EmptySource);
        };
        let space = target.empty_count();
        if space == 0 {
            return Err(PourError::DestinationFull);
        }
        if let Some(target_color) = target.top_color()
            && target_color != top.color
        {
            return Err(PourError::ColorMismatch);
        }
        if space == BOTTLE_CAPACITY && source.is_uniform() {
            return Err(PourError::NoOp);
        }
        Ok(MoveAction {
            from,
            to,
            color: top.color,
            amount: top.count.min(space),
        })
    }

    pub fn can_pour(&self, from: usize, to: usize) -> bool {
        self.check_pour(from, to).is_ok()
    }

    /// Returns the puzzle after pouring, leaving `self` untouched.
    pub fn pour(&self, from: usize, to: usize) -> Option<Puzzle> {
        let mut next = self.clone();
        next.apply_pour(from, to).ok()?;
        Some(next)
    }

    /// Pours in place. On error nothing is modified.
    pub fn apply_pour(&mut self, from: usize, to: usize) -> Result<MoveAction, PourError> {
        let action = self.plan_pour(from, to)?;
        self.transfer(from, to, action.amount);
        Ok(action)
    }

    /// Moves `amount` layers off the top of `from` into `to` without checking
    /// the pour rules. Callers guarantee the run and the space exist.
    pub(crate) fn transfer(&mut self, from: usize, to: usize, amount: usize) {
        let Some(color) = self.bottles[from].top_color() else {
            return;
        };
        self.bottles[from].remove_top(amount);
        self.bottles[to].fill(color, amount);
    }

    /// Every legal pour from this position, in (from, to) index order.
    pub fn legal_moves(&self) -> impl Iterator<Item = MoveAction> + '_ {
        let n = self.bottles.len();
        (0..n)
            .flat_map(move |from| (0..n).map(move |to| (from, to)))
            .filter_map(move |(from, to)| self.plan_pour(from, to).ok())
    }

    pub fn state_key(&self) -> StateKey {
        let mut contents: Vec<[Layer; BOTTLE_CAPACITY]> =
            self.bottles.iter().map(|b| b.layers).collect();
        contents.sort_unstable();
        StateKey(contents)
    }

    /// How many layers of each color are in play.
    pub fn color_counts(&self) -> BTreeMap<Color, usize> {
        let mut counts = BTreeMap::new();
        for color in self.bottles.iter().flat_map(|b| b.layers.iter().filter_map(Layer::color)) {
            *counts.entry(color).or_insert(0) += 1;
        }
        counts
    }

    /// Each color fills exactly one bottle's worth and there are enough
    /// bottles to hold every color separately.
    pub fn is_well_formed(&self) -> bool {
        let counts = self.color_counts();
        counts.len() <= self.bottles.len() && counts.values().all(|&c| c == BOTTLE_CAPACITY)
    }

    /// Every color comes in whole bottles and there are enough bottles to
    /// hold them. Solved positions are only reachable when this holds.
    pub fn can_complete_bottles(&self) -> bool {
        let counts = self.color_counts();
        let needed: usize = counts.values().map(|&c| c / BOTTLE_CAPACITY).sum();
        needed <= self.bottles.len() && counts.values().all(|&c| c % BOTTLE_CAPACITY == 0)
    }

    pub fn shuffle_bottles(&mut self, rng: &mut SeededRng) {
        rng.shuffle(&mut self.bottles);
    }

    /// Renumbers bottles 0.. in display order.
    pub fn reassign_ids(&mut self) {
        for (id, bottle) in self.bottles.iter_mut().enumerate() {
            bottle.id = id;
        }
    }

    pub fn text_representation(&self) -> String {
        self.bottles
            .iter()
            .map(Bottle::text_representation)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for Puzzle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text_representation())
    }
}
