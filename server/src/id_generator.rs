use rand::Rng;

const ADJECTIVES: &[&str] = &[
    "amber", "brisk", "calm", "daring", "eager", "frosty", "grand", "hazy",
    "ivory", "jolly", "keen", "lucid", "merry", "nimble", "plucky", "vivid",
];

const NOUNS: &[&str] = &[
    "anchor", "beacon", "comet", "dune", "ember", "fjord", "glacier", "harbor",
    "island", "jungle", "lagoon", "meadow", "nebula", "orchid", "prairie", "summit",
];

pub fn generate_match_id() -> String {
    let mut rng = rand::rng();
    let adjective = ADJECTIVES[rng.random_range(0..ADJECTIVES.len())];
    let noun = NOUNS[rng.random_range(0..NOUNS.len())];
    let suffix: u32 = rng.random_range(1000..10000);
    format!("{}-{}-{}", adjective, noun, suffix)
}
