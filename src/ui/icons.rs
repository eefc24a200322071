pub struct Icons;

impl Icons {
    pub const CHECK: &str = "✅";
    pub const CROSS: &str = "❌";
    pub const WARN: &str = "⚠️";
    pub const INFO: &str = "ℹ️";
    pub const STATS: &str = "📊";
    pub const PEOPLE: &str = "👥";
    pub const DATABASE: &str = "🗄️";
    pub const BUILDING: &str = "🏢";
    pub const GLOBE: &str = "🌍";
}
