//! Seed data: the built-in sample video catalog.

use uuid::Uuid;

use crate::domain::Video;

/// (name, tag) pairs of the sample catalog, in catalog order.
const SAMPLE_VIDEOS: [(&str, &str); 9] = [
  ("Introduction to Python", "Programming"),
  ("Machine Learning Basics", "AI"),
  ("Web Development with Django", "Web"),
  ("Data Structures and Algorithms", "Programming"),
  ("Deep Learning Fundamentals", "AI"),
  ("invideo-ai-480 How to Calculate Your Business Funding N 2024-09-14", "Business"),
  ("invideo-ai-480 Understanding Recursion in Programming_  2024-09-14", "Recursive"),
  ("invideo-ai-480 Unlock the Power of Pandas in Python! 2024-09-14", "Pandas"),
  ("invideo-ai-720 How Netflix Knows What You Want to Watch 2024-09-14", "Neflix"),
];

/// Fresh sample videos with new ids and zeroed counters.
pub fn sample_videos() -> Vec<Video> {
  SAMPLE_VIDEOS
    .iter()
    .map(|(name, tag)| Video::new(Uuid::new_v4().to_string(), *name, *tag))
    .collect()
}
