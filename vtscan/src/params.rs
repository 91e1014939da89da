//! Parameter storage for CSI and DCS sequences.

/// The value recorded for a parameter position that was present in the
/// sequence but had no digits, as in `CSI ;5H`.  Handlers substitute
/// their per-command default when they see it.
pub const PARAM_ABSENT: i32 = -1;

/// No standard sequence uses anywhere near this many parameters; excess
/// parameters are accumulated but silently dropped.
const MAX_PARAMS: usize = 32;

/// An ordered list of numeric sequence parameters, with support for the
/// colon-delimited sub-parameters used by extended SGR sequences such as
/// `CSI 58:2::r:g:b m`.
///
/// Parameters are 32 bit signed; digit accumulation saturates rather
/// than wrapping so hostile input cannot overflow.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    values: Vec<i32>,
    /// Sub-parameters, keyed by the index of their owning parameter.
    subs: Vec<(usize, i32)>,
    full: bool,
}

impl Params {
    pub fn new() -> Self {
        Default::default()
    }

    /// Number of (main) parameters.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Append a parameter.  `PARAM_ABSENT` records an omitted position.
    pub fn add(&mut self, value: i32) {
        if self.values.len() == MAX_PARAMS {
            self.full = true;
            return;
        }
        self.values.push(value);
    }

    /// Replace the most recently added parameter; used by the scanner as
    /// digits accumulate.  Appends if no parameter exists yet.
    pub fn update_last(&mut self, value: i32) {
        match self.values.last_mut() {
            Some(last) => *last = value,
            None => self.add(value),
        }
    }

    /// Attach a sub-parameter to the most recently added parameter.
    pub fn add_sub(&mut self, value: i32) {
        if self.values.is_empty() || self.full {
            return;
        }
        self.subs.push((self.values.len() - 1, value));
    }

    /// The parameter at `idx`, or `default` when the position is out of
    /// range or was recorded as absent.
    pub fn get(&self, idx: usize, default: i32) -> i32 {
        match self.values.get(idx) {
            Some(&v) if v != PARAM_ABSENT => v,
            _ => default,
        }
    }

    /// True when a parameter exists at `idx` and is not the absent
    /// sentinel.
    pub fn has(&self, idx: usize) -> bool {
        matches!(self.values.get(idx), Some(&v) if v != PARAM_ABSENT)
    }

    /// The raw parameter values, absent sentinels included.
    pub fn to_array(&self) -> &[i32] {
        &self.values
    }

    /// Sub-parameters attached to the parameter at `idx`, in order.
    pub fn subs(&self, idx: usize) -> impl Iterator<Item = i32> + '_ {
        self.subs
            .iter()
            .filter(move |(owner, _)| *owner == idx)
            .map(|(_, v)| *v)
    }

    pub fn has_subs(&self, idx: usize) -> bool {
        self.subs.iter().any(|(owner, _)| *owner == idx)
    }

    pub fn reset(&mut self) {
        self.values.clear();
        self.subs.clear();
        self.full = false;
    }

    /// True once parameters have been discarded for capacity.
    pub fn is_full(&self) -> bool {
        self.full
    }
}

impl From<&[i32]> for Params {
    fn from(values: &[i32]) -> Params {
        let mut p = Params::new();
        for &v in values {
            p.add(v);
        }
        p
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use k9::assert_equal as assert_eq;

    #[test]
    fn defaults_for_absent() {
        let mut p = Params::new();
        p.add(PARAM_ABSENT);
        p.add(5);
        assert_eq!(p.get(0, 1), 1);
        assert_eq!(p.get(1, 1), 5);
        assert_eq!(p.get(2, 7), 7);
        assert_eq!(p.has(0), false);
        assert_eq!(p.has(1), true);
        assert_eq!(p.has(2), false);
    }

    #[test]
    fn update_last_accumulates() {
        let mut p = Params::new();
        p.add(3);
        p.update_last(38);
        assert_eq!(p.to_array(), &[38][..]);
        let mut empty = Params::new();
        empty.update_last(9);
        assert_eq!(empty.to_array(), &[9][..]);
    }

    #[test]
    fn sub_params_track_owner() {
        let mut p = Params::new();
        p.add(4);
        p.add_sub(3);
        p.add(58);
        p.add_sub(2);
        p.add_sub(255);
        assert_eq!(p.subs(0).collect::<Vec<_>>(), vec![3]);
        assert_eq!(p.subs(1).collect::<Vec<_>>(), vec![2, 255]);
        assert_eq!(p.has_subs(0), true);
        assert_eq!(p.has_subs(2), false);
    }

    #[test]
    fn capacity_is_bounded() {
        let mut p = Params::new();
        for i in 0..MAX_PARAMS as i32 + 10 {
            p.add(i);
        }
        assert_eq!(p.len(), MAX_PARAMS);
        assert_eq!(p.is_full(), true);
        assert_eq!(p.get(0, 0), 0);
        assert_eq!(p.get(MAX_PARAMS - 1, 0), MAX_PARAMS as i32 - 1);
    }
}
