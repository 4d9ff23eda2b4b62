use memsim_core::cache::CacheLine;
use memsim_core::cache::policies::ReplacementPolicy;
use mockall::mock;

mock! {
    pub Policy {}
    impl ReplacementPolicy for Policy {
        fn victim(&self, set: &[CacheLine]) -> usize;
    }
}
