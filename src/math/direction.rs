//! Cardinal directions and "direction + amount" arguments

use std::fmt;
use std::str::FromStr;

use glam::IVec3;

use crate::core::error::PreconditionError;

/// World-aligned direction. East is +X, Up is +Y, North is +Z.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    South,
    East,
    West,
    Up,
    Down,
}

impl Direction {
    pub const ALL: [Direction; 6] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
        Direction::Up,
        Direction::Down,
    ];

    /// Unit step for this direction
    pub fn to_ivec3(self) -> IVec3 {
        match self {
            Direction::North => IVec3::Z,
            Direction::South => IVec3::NEG_Z,
            Direction::East => IVec3::X,
            Direction::West => IVec3::NEG_X,
            Direction::Up => IVec3::Y,
            Direction::Down => IVec3::NEG_Y,
        }
    }

    /// Points along +X, +Y or +Z
    pub fn is_positive(self) -> bool {
        matches!(self, Direction::North | Direction::East | Direction::Up)
    }

    /// 0 for X, 1 for Y, 2 for Z
    pub fn axis_index(self) -> usize {
        match self {
            Direction::East | Direction::West => 0,
            Direction::Up | Direction::Down => 1,
            Direction::North | Direction::South => 2,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::North => "north",
            Direction::South => "south",
            Direction::East => "east",
            Direction::West => "west",
            Direction::Up => "up",
            Direction::Down => "down",
        };
        f.write_str(name)
    }
}

impl FromStr for Direction {
    type Err = PreconditionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "n" | "north" => Ok(Direction::North),
            "s" | "south" => Ok(Direction::South),
            "e" | "east" => Ok(Direction::East),
            "w" | "west" => Ok(Direction::West),
            "u" | "up" => Ok(Direction::Up),
            "d" | "down" => Ok(Direction::Down),
            _ => Err(PreconditionError::InvalidDirection(s.to_string())),
        }
    }
}

/// A direction with a step count, as typed by the user
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DirectionAmount {
    pub direction: Direction,
    pub amount: i32,
}

impl DirectionAmount {
    /// Parse `"5"`, `"up"`, `"up 5"` or `"5 up"`.
    ///
    /// A missing direction falls back to `facing`, a missing amount to 1.
    pub fn parse(text: &str, facing: Direction) -> Result<Self, PreconditionError> {
        let invalid = || PreconditionError::InvalidDirection(text.to_string());
        let parts: Vec<&str> = text
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|p| !p.is_empty())
            .collect();

        let mut direction = None;
        let mut amount = None;
        for part in parts {
            if let Ok(n) = part.parse::<i32>() {
                if amount.replace(n).is_some() {
                    return Err(invalid());
                }
            } else {
                let d = part.parse::<Direction>().map_err(|_| invalid())?;
                if direction.replace(d).is_some() {
                    return Err(invalid());
                }
            }
        }

        let amount = amount.unwrap_or(1);
        if amount < 0 {
            return Err(invalid());
        }

        Ok(Self {
            direction: direction.unwrap_or(facing),
            amount,
        })
    }

    /// Total offset described by this argument
    pub fn offset(&self) -> IVec3 {
        self.direction.to_ivec3() * self.amount
    }
}
