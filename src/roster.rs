use rand::Rng;

use crate::error::DojoError;

/// Ordered roster of participant names.
///
/// Insertion order is significant: it is the rotation order used to pick the
/// pilot and co-pilot. Names are unique (exact, case-sensitive match) and
/// never blank. The roster itself is state-agnostic; the controller decides
/// when mutation is allowed.
#[derive(Debug, Default)]
pub struct Roster {
    names: Vec<String>,
}

impl Roster {
    pub fn new() -> Self {
        Self { names: Vec::new() }
    }

    /// Appends a participant to the end of the roster.
    pub fn add(&mut self, name: &str) -> Result<(), DojoError> {
        if name.trim().is_empty() {
            return Err(DojoError::InvalidArgument);
        }
        if self.names.iter().any(|n| n == name) {
            return Err(DojoError::DuplicateName(name.to_string()));
        }
        self.names.push(name.to_string());
        Ok(())
    }

    /// Removes a participant by exact name.
    pub fn remove(&mut self, name: &str) -> Result<(), DojoError> {
        match self.names.iter().position(|n| n == name) {
            Some(index) => {
                self.names.remove(index);
                Ok(())
            }
            None => Err(DojoError::NameNotFound(name.to_string())),
        }
    }

    /// Clears the roster. Succeeds silently on an already-empty roster.
    pub fn clear(&mut self) {
        self.names.clear();
    }

    /// Mixes the roster with the pairwise-swap scheme the dojo has always
    /// used: `len` passes, each swapping two independently chosen random
    /// positions. Self-swaps can happen, so the result is well mixed but not
    /// a formally uniform permutation. No-op for rosters of size 0 or 1.
    pub fn shuffle(&mut self) {
        let len = self.names.len();
        if len <= 1 {
            return;
        }
        let mut rng = rand::thread_rng();
        for _ in 0..len {
            let a = rng.gen_range(0..len);
            let b = rng.gen_range(0..len);
            self.names.swap(a, b);
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}
