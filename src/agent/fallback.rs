use super::CLOSING_LINE;

/// Builds the canned post used whenever live generation is unavailable.
pub fn fallback(topic: &str) -> String {
    format!(
        r#"# {topic}: An Essential Guide

Hey there! Today we're looking at {topic}, a topic that keeps coming up for people who want to get better at their work.

## Key Points
- Focus on what matters most
- Use the right tools for your specific needs
- Remember that fundamentals stay important even as technology changes
- Start small and build momentum
- Learn from others but develop your own approach

The landscape is always changing, but don't let that intimidate you. The people who do best aren't the ones with the fanciest tools or techniques. They're the ones who keep applying what they know and keep learning.

I've found that setting aside just 15 minutes a day for {topic} leads to real improvements over time. It's not about massive overhauls, it's about small, consistent actions.

{CLOSING_LINE}
"#
    )
}
