#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Range {
    pub start: u64,
    pub count: u64,
}

impl Range {
    #[inline]
    pub fn new(start: u32, count: u32) -> Self {
        Self {
            start: start.into(),
            count: count.into(),
        }
    }

    #[inline]
    pub fn end(&self) -> u64 {
        self.start + self.count
    }

    #[inline]
    pub fn includes(&self, block: u64) -> bool {
        block >= self.start && block < self.end()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn includes() {
        let range = Range::new(2, 50);
        assert!(!range.includes(1));
        assert!(range.includes(2));
        assert!(range.includes(51));
        assert!(!range.includes(52));

        assert!(!Range::new(7, 0).includes(7));
    }

    #[test]
    fn no_wrap() {
        let range = Range::new(u32::MAX, u32::MAX);
        assert_eq!(range.end(), 2 * u32::MAX as u64);
        assert!(range.includes(u32::MAX as u64 + 1));
    }
}
