/*!

This is the long-form manual for `crowd_scoring` and `crowdtally`.

## Scoring

Each answer is worth the number of participants who gave the same answer to the
same question. Answers are compared after trimming the spaces and ignoring the
case: `Blue`, `blue` and ` blue ` are the same answer. Unanswered questions are
worth nothing.

When a participant submitted the form several times, only the last completed
submission is kept.

### Bonus questions

A question whose title starts with 🎯 and ends with the designated answer in
brackets is a bonus question:

```text
🎯 Which planet has the most moons? [Saturn]
```

The designated answer is worth one and a half times the number of votes of the most
popular answer, rounded down. If the most popular answer was given 7 times, the
designated answer is worth 10 points. The other answers are scored as usual.

## Teams

When a roster is provided, the participants are grouped by team and the scores of
the members are summed. Every participant must be on a team of the roster. The
roster is a JSON file:

```json
{
  "Owls": [
    {"email": "ann@example.com", "name": "Ann"},
    {"email": "bob@example.com", "name": "Bob"}
  ],
  "Larks": [
    {"email": "cid@example.com", "name": "Cid"}
  ]
}
```

A complete team has 4 members. When fewer members of a team responded, each of the
missing members is given a fill-in score, according to the `--missing` option:

* `avg` (default) the average score of the members who responded, rounded down
* `least` the lowest score of the members who responded
* `middle` the second best score of the members who responded, or the only score
if only one member responded

A team where nobody responded scores 0.

## Input formats

### `msforms`

The Excel (.xlsx) export of the responses of Microsoft Forms. The first columns must be
`ID`, `Start time`, `Completion time`, `Email` and `Name`. Quizzes are also supported:
in that case the export has a `Total points` and a `Quiz feedback` column, and each
question is followed by its `Points - ` and `Feedback - ` columns, which are ignored.

### `csv`

The CSV export of the responses of Google Forms (or of the attached Google Sheet). The
first columns must be `Timestamp` and `Email Address`. If the third column starts with
`Your Name`, it is used as the name of the participant, otherwise the email is used.
Numbered titles such as `3. Favorite color?` lose their number.

## Output

The program prints the answers of every question ranked by popularity, the score of
each participant and, in team mode, the members who did not respond and the scores of
the teams. With `--out`, the same results are written in JSON format.

*/
