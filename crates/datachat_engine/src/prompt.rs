//! Request assembly for the three conversations the binary has with the model.

use crate::{CompletionOptions, CompletionRequest, DatasetSnapshot};

const CHAT_SYSTEM_PREFIX: &str = "I will now be asking you questions regarding this CSV:";
const CHAT_USER_PREFIX: &str = "Here is my input regarding the CSV file:";

const ANALYSIS_TASK: &str = "Data Analysis Task:
You are provided with a dataset containing various attributes. Your task is to analyze this data and draw conclusions on what the output is and what most influences the output. Format your response as follows:

1. **Possible Influences On Data**: List potential influences and what they are most likely to be. Include percentages where possible.
2. **Conclusions/inferred relationships**: Based on the dataset, list any conclusions or inferred relationships, up to 5. Include percentages where possible.
3. **Recommended Features to Add**: Suggest features that could be added to improve analysis.
4. **Model Recommendations**: Recommend models or algorithms suitable for this analysis.";

const NOTEBOOK_TASK: &str = "Machine Learning Task:
Given the data provided below, write a Jupyter Notebook that includes the following sections as separate fenced ```python code blocks:

1. **Data Loading and Inspection**: load the dataset with pandas, display the first rows, print column information and summary statistics.
2. **Data Preprocessing and Cleaning**: handle missing values, encode categorical variables, make sure the target variable is numeric, and print the processed rows.
3. **Exploratory Data Analysis (EDA)**: count plots, box plots and histograms with commented insights.
4. **Model Training and Evaluation**: split the data, build a preprocessing pipeline for categorical and numerical features, train a Linear Regression model, and report MSE and R-squared with predicted vs actual values.
5. **Conclusion and Future Work**: summarize the findings and suggest further analysis.

Ensure all explanations are written as comments inside the code.";

/// Question about the dataset typed by the user.
pub fn chat_request(
    snapshot: &DatasetSnapshot,
    user_text: &str,
    options: &CompletionOptions,
) -> CompletionRequest {
    CompletionRequest {
        system_context: Some(format!("{CHAT_SYSTEM_PREFIX}\n\n{}", snapshot.as_context())),
        user_text: format!("{CHAT_USER_PREFIX} {user_text}"),
        options: options.clone(),
    }
}

/// Influences, conclusions, features and model suggestions for the dataset.
pub fn analysis_request(
    snapshot: &DatasetSnapshot,
    options: &CompletionOptions,
) -> CompletionRequest {
    CompletionRequest {
        system_context: Some(ANALYSIS_TASK.to_string()),
        user_text: format!("{ANALYSIS_TASK}\n\nData: {}", snapshot.as_context()),
        options: options.clone(),
    }
}

/// Notebook generation. Expects a summary-mode snapshot.
pub fn notebook_request(
    summary: &DatasetSnapshot,
    options: &CompletionOptions,
) -> CompletionRequest {
    CompletionRequest {
        system_context: None,
        user_text: format!("{NOTEBOOK_TASK}\n\n{}", summary.as_context()),
        options: options.clone(),
    }
}
