//! Synthetic replacement values for pseudonymize mode

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

const FIRST_NAMES: &[&str] = &[
    "Avery", "Blake", "Carmen", "Dana", "Elliot", "Farah", "Gideon", "Harper", "Imani", "Jonah",
    "Keira", "Lucian", "Marisol", "Nolan", "Odette", "Priya", "Quentin", "Rosalind", "Soren",
    "Talia", "Umberto", "Vivian", "Wesley", "Ximena", "Yusuf", "Zelda",
];

const LAST_NAMES: &[&str] = &[
    "Abernathy", "Blackwood", "Castellano", "Delacroix", "Eastwick", "Fairbanks", "Galloway",
    "Hollister", "Ingram", "Jaramillo", "Kowalski", "Lindqvist", "Montgomery", "Nakamura",
    "Okonkwo", "Pemberton", "Quimby", "Ravensworth", "Sorensen", "Thistlewood", "Underhill",
    "Valdivia", "Whitcombe", "Yarborough", "Zielinski",
];

const COMPANY_SUFFIXES: &[&str] = &[
    "Holdings", "Group", "Partners", "Industries", "Labs", "Consulting", "Logistics", "Systems",
];

const CITIES: &[&str] = &[
    "Fairhaven", "Brookmere", "Larchmont Falls", "Westbridge", "Stonecrest", "Millbrook",
    "Ashford Lake", "Kingsport", "Silverton", "Redwater", "Elmstead", "Oakridge Bay",
];

const EMAIL_DOMAINS: &[&str] = &["example.com", "example.org", "example.net"];

/// Kind of synthetic value produced for a detection category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PseudonymKind {
    Email,
    Phone,
    GovernmentId,
    CreditCard,
    Person,
    Organization,
    Place,
    Group,
    Fallback,
}

impl PseudonymKind {
    /// Maps a pattern category or entity label to a value kind.
    pub fn for_category(category: &str) -> Self {
        match category {
            "email" => PseudonymKind::Email,
            "phone" => PseudonymKind::Phone,
            "ssn" => PseudonymKind::GovernmentId,
            "credit_card" => PseudonymKind::CreditCard,
            "PERSON" => PseudonymKind::Person,
            "ORG" => PseudonymKind::Organization,
            "GPE" | "LOC" => PseudonymKind::Place,
            "NORP" => PseudonymKind::Group,
            _ => PseudonymKind::Fallback,
        }
    }
}

/// Generates synthetic values from a seedable RNG
#[derive(Debug)]
pub struct PseudonymGenerator {
    rng: StdRng,
}

impl PseudonymGenerator {
    /// Seeded generators repeat the same sequence; `None` uses OS entropy.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    pub fn generate(&mut self, kind: PseudonymKind) -> String {
        match kind {
            PseudonymKind::Email => {
                let first = self.pick(FIRST_NAMES).to_lowercase();
                let last = self.pick(LAST_NAMES).to_lowercase();
                let domain = self.pick(EMAIL_DOMAINS);
                format!("{}.{}@{}", first, last, domain)
            }
            PseudonymKind::Phone => {
                let area = self.rng.gen_range(201..=989);
                let line = self.rng.gen_range(100..=199);
                // 555-01xx is reserved for fictional use
                format!("({:03}) 555-{:04}", area, line)
            }
            PseudonymKind::GovernmentId => {
                // area numbers 900-999 are never issued
                let area = self.rng.gen_range(900..=999);
                let group = self.rng.gen_range(1..=99);
                let serial = self.rng.gen_range(1..=9999);
                format!("{:03}-{:02}-{:04}", area, group, serial)
            }
            PseudonymKind::CreditCard => self.card_number(),
            PseudonymKind::Person => {
                format!("{} {}", self.pick(FIRST_NAMES), self.pick(LAST_NAMES))
            }
            PseudonymKind::Organization => {
                format!("{} {}", self.pick(LAST_NAMES), self.pick(COMPANY_SUFFIXES))
            }
            PseudonymKind::Place => self.pick(CITIES).to_string(),
            PseudonymKind::Group => "Group".to_string(),
            PseudonymKind::Fallback => "REDACTED".to_string(),
        }
    }

    fn pick(&mut self, items: &'static [&'static str]) -> &'static str {
        items.choose(&mut self.rng).copied().unwrap_or("X")
    }

    /// 16-digit number on the 4xxx prefix with a valid Luhn check digit
    fn card_number(&mut self) -> String {
        let mut digits: Vec<u32> = vec![4];
        digits.extend((0..14).map(|_| self.rng.gen_range(0..10)));
        digits.push(luhn_check_digit(&digits));
        digits.iter().map(|d| char::from_digit(*d, 10).unwrap_or('0')).collect()
    }
}

fn luhn_check_digit(payload: &[u32]) -> u32 {
    let sum: u32 = payload
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| {
            if i % 2 == 0 {
                let doubled = d * 2;
                if doubled > 9 { doubled - 9 } else { doubled }
            } else {
                d
            }
        })
        .sum();
    (10 - sum % 10) % 10
}

#[cfg(test)]
mod tests {
    use super::*;

    fn luhn_valid(number: &str) -> bool {
        let digits: Vec<u32> = number.chars().filter_map(|c| c.to_digit(10)).collect();
        let (payload, check) = digits.split_at(digits.len() - 1);
        luhn_check_digit(payload) == check[0]
    }

    #[test]
    fn test_category_dispatch() {
        assert_eq!(PseudonymKind::for_category("email"), PseudonymKind::Email);
        assert_eq!(PseudonymKind::for_category("GPE"), PseudonymKind::Place);
        assert_eq!(PseudonymKind::for_category("LOC"), PseudonymKind::Place);
        assert_eq!(PseudonymKind::for_category("NORP"), PseudonymKind::Group);
        assert_eq!(PseudonymKind::for_category("DATE"), PseudonymKind::Fallback);
    }

    #[test]
    fn test_seeded_generators_agree() {
        let mut a = PseudonymGenerator::new(Some(11));
        let mut b = PseudonymGenerator::new(Some(11));
        for kind in [PseudonymKind::Person, PseudonymKind::Email, PseudonymKind::Phone] {
            assert_eq!(a.generate(kind), b.generate(kind));
        }
    }

    #[test]
    fn test_value_shapes() {
        let mut generator = PseudonymGenerator::new(Some(3));
        assert!(generator.generate(PseudonymKind::Email).contains('@'));
        let ssn = generator.generate(PseudonymKind::GovernmentId);
        assert_eq!(ssn.len(), 11);
        assert!(ssn.starts_with('9'));
        let card = generator.generate(PseudonymKind::CreditCard);
        assert_eq!(card.len(), 16);
        assert!(luhn_valid(&card));
        assert!(generator.generate(PseudonymKind::Phone).contains("555-01"));
        assert_eq!(generator.generate(PseudonymKind::Group), "Group");
        assert_eq!(generator.generate(PseudonymKind::Fallback), "REDACTED");
    }

    #[test]
    fn test_known_luhn_digit() {
        // 7992739871 -> 3
        assert_eq!(luhn_check_digit(&[7, 9, 9, 2, 7, 3, 9, 8, 7, 1]), 3);
    }
}
